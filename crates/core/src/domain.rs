//! Domain entities and their closed status/kind sets.
//!
//! Identifiers are numeric and assigned by the store, mirroring the
//! autoincrement primary keys of the relational schema this service fronts.
//! Enum wire names are `snake_case` throughout.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Entity kinds known to the store, used for error and audit labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Patient,
    Professional,
    Bed,
    Admission,
    ClinicalRecord,
    Appointment,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Patient => "patient",
            EntityKind::Professional => "professional",
            EntityKind::Bed => "bed",
            EntityKind::Admission => "admission",
            EntityKind::ClinicalRecord => "clinical record",
            EntityKind::Appointment => "appointment",
        };
        f.write_str(name)
    }
}

/// Care-unit category of a bed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BedKind {
    Ward,
    Icu,
    Isolation,
    SemiPrivate,
}

/// Occupancy status of a bed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BedStatus {
    Available,
    Occupied,
    Maintenance,
}

/// Status of a hospital admission.
///
/// Transitions are monotonic: `Admitted` moves to exactly one terminal state
/// and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionStatus {
    Admitted,
    Discharged,
    Transferred,
    Deceased,
}

impl AdmissionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AdmissionStatus::Admitted)
    }
}

impl std::str::FromStr for AdmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admitted" => Ok(AdmissionStatus::Admitted),
            "discharged" => Ok(AdmissionStatus::Discharged),
            "transferred" => Ok(AdmissionStatus::Transferred),
            "deceased" => Ok(AdmissionStatus::Deceased),
            other => Err(format!("unknown admission status: {other}")),
        }
    }
}

/// Delivery mode of an outpatient appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentKind {
    InPerson,
    Telemedicine,
}

/// Status of an outpatient appointment.
///
/// `Scheduled` is the only entry state; `Completed` and `Cancelled` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl std::str::FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("unknown appointment status: {other}")),
        }
    }
}

/// A registered patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    /// National document number; unique across the registry.
    pub national_id: String,
    pub birth_date: Option<NaiveDate>,
}

/// A registered healthcare professional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professional {
    pub id: i64,
    pub name: String,
    /// Professional licence number; unique across the registry.
    pub registration: String,
    pub specialty: Option<String>,
}

/// A physical care-unit slot.
///
/// Invariant: `status == Occupied` exactly when `admission_id` is `Some` and
/// refers to an admission whose status is `Admitted`. Discharge clears both
/// in the same transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bed {
    pub id: i64,
    /// Unique display label, e.g. "101".
    pub number: String,
    pub kind: BedKind,
    pub unit: String,
    pub status: BedStatus,
    /// Back-reference to the admission currently occupying this bed.
    pub admission_id: Option<i64>,
}

/// A hospital stay linking a patient to a bed for a bounded period.
///
/// Invariant: `discharged_at` is `Some` exactly when the status is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admission {
    pub id: i64,
    pub patient_id: i64,
    pub admitted_at: DateTime<Utc>,
    pub discharged_at: Option<DateTime<Utc>>,
    pub reason: String,
    pub diagnosis: Option<String>,
    pub status: AdmissionStatus,
}

/// A versioned free-text clinical note authored by a professional.
///
/// Invariant: `signed` is `true` exactly when `signature_hash` and
/// `signed_at` are both `Some`. Any content update resets all three.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalRecord {
    pub id: i64,
    pub patient_id: i64,
    pub professional_id: i64,
    pub content: String,
    /// Starts at 1; incremented by exactly 1 per content update.
    pub version: u32,
    pub signed: bool,
    pub signature_hash: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,
}

/// A scheduled outpatient consultation between a patient and a
/// professional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub professional_id: i64,
    pub scheduled_on: NaiveDate,
    pub scheduled_at: NaiveTime,
    pub kind: AppointmentKind,
    pub status: AppointmentStatus,
    pub reason: Option<String>,
}

/// An admission joined with its patient summary and current bed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdmissionDetails {
    pub admission: Admission,
    pub patient: Patient,
    pub bed: Option<Bed>,
}
