//! Wire types for the REST surface.
//!
//! These mirror the core domain types but carry the OpenAPI schema derives,
//! which keeps `utoipa` out of the core crate. Conversions are one-way from
//! the domain: requests are deconstructed field by field in the handlers.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use vidaplus_core as domain;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BedKind {
    Ward,
    Icu,
    Isolation,
    SemiPrivate,
}

impl From<BedKind> for domain::BedKind {
    fn from(kind: BedKind) -> Self {
        match kind {
            BedKind::Ward => domain::BedKind::Ward,
            BedKind::Icu => domain::BedKind::Icu,
            BedKind::Isolation => domain::BedKind::Isolation,
            BedKind::SemiPrivate => domain::BedKind::SemiPrivate,
        }
    }
}

impl From<domain::BedKind> for BedKind {
    fn from(kind: domain::BedKind) -> Self {
        match kind {
            domain::BedKind::Ward => BedKind::Ward,
            domain::BedKind::Icu => BedKind::Icu,
            domain::BedKind::Isolation => BedKind::Isolation,
            domain::BedKind::SemiPrivate => BedKind::SemiPrivate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BedStatus {
    Available,
    Occupied,
    Maintenance,
}

impl From<domain::BedStatus> for BedStatus {
    fn from(status: domain::BedStatus) -> Self {
        match status {
            domain::BedStatus::Available => BedStatus::Available,
            domain::BedStatus::Occupied => BedStatus::Occupied,
            domain::BedStatus::Maintenance => BedStatus::Maintenance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionStatus {
    Admitted,
    Discharged,
    Transferred,
    Deceased,
}

impl From<domain::AdmissionStatus> for AdmissionStatus {
    fn from(status: domain::AdmissionStatus) -> Self {
        match status {
            domain::AdmissionStatus::Admitted => AdmissionStatus::Admitted,
            domain::AdmissionStatus::Discharged => AdmissionStatus::Discharged,
            domain::AdmissionStatus::Transferred => AdmissionStatus::Transferred,
            domain::AdmissionStatus::Deceased => AdmissionStatus::Deceased,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentKind {
    InPerson,
    Telemedicine,
}

impl From<AppointmentKind> for domain::AppointmentKind {
    fn from(kind: AppointmentKind) -> Self {
        match kind {
            AppointmentKind::InPerson => domain::AppointmentKind::InPerson,
            AppointmentKind::Telemedicine => domain::AppointmentKind::Telemedicine,
        }
    }
}

impl From<domain::AppointmentKind> for AppointmentKind {
    fn from(kind: domain::AppointmentKind) -> Self {
        match kind {
            domain::AppointmentKind::InPerson => AppointmentKind::InPerson,
            domain::AppointmentKind::Telemedicine => AppointmentKind::Telemedicine,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl From<AppointmentStatus> for domain::AppointmentStatus {
    fn from(status: AppointmentStatus) -> Self {
        match status {
            AppointmentStatus::Scheduled => domain::AppointmentStatus::Scheduled,
            AppointmentStatus::Completed => domain::AppointmentStatus::Completed,
            AppointmentStatus::Cancelled => domain::AppointmentStatus::Cancelled,
        }
    }
}

impl From<domain::AppointmentStatus> for AppointmentStatus {
    fn from(status: domain::AppointmentStatus) -> Self {
        match status {
            domain::AppointmentStatus::Scheduled => AppointmentStatus::Scheduled,
            domain::AppointmentStatus::Completed => AppointmentStatus::Completed,
            domain::AppointmentStatus::Cancelled => AppointmentStatus::Cancelled,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePatientReq {
    pub name: String,
    pub national_id: String,
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientRes {
    pub id: i64,
    pub name: String,
    pub national_id: String,
    pub birth_date: Option<NaiveDate>,
}

impl From<domain::Patient> for PatientRes {
    fn from(patient: domain::Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            national_id: patient.national_id,
            birth_date: patient.birth_date,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListPatientsRes {
    pub patients: Vec<PatientRes>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProfessionalReq {
    pub name: String,
    pub registration: String,
    pub specialty: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfessionalRes {
    pub id: i64,
    pub name: String,
    pub registration: String,
    pub specialty: Option<String>,
}

impl From<domain::Professional> for ProfessionalRes {
    fn from(professional: domain::Professional) -> Self {
        Self {
            id: professional.id,
            name: professional.name,
            registration: professional.registration,
            specialty: professional.specialty,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListProfessionalsRes {
    pub professionals: Vec<ProfessionalRes>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBedReq {
    pub number: String,
    pub kind: BedKind,
    pub unit: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BedRes {
    pub id: i64,
    pub number: String,
    pub kind: BedKind,
    pub unit: String,
    pub status: BedStatus,
    pub admission_id: Option<i64>,
}

impl From<domain::Bed> for BedRes {
    fn from(bed: domain::Bed) -> Self {
        Self {
            id: bed.id,
            number: bed.number,
            kind: bed.kind.into(),
            unit: bed.unit,
            status: bed.status.into(),
            admission_id: bed.admission_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListBedsRes {
    pub beds: Vec<BedRes>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdmitReq {
    pub patient_id: i64,
    pub bed_id: i64,
    pub reason: String,
    pub diagnosis: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdmitRes {
    pub admission_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdmissionRes {
    pub id: i64,
    pub patient_id: i64,
    pub admitted_at: DateTime<Utc>,
    pub discharged_at: Option<DateTime<Utc>>,
    pub reason: String,
    pub diagnosis: Option<String>,
    pub status: AdmissionStatus,
}

impl From<domain::Admission> for AdmissionRes {
    fn from(admission: domain::Admission) -> Self {
        Self {
            id: admission.id,
            patient_id: admission.patient_id,
            admitted_at: admission.admitted_at,
            discharged_at: admission.discharged_at,
            reason: admission.reason,
            diagnosis: admission.diagnosis,
            status: admission.status.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListAdmissionsRes {
    pub admissions: Vec<AdmissionRes>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdmissionDetailsRes {
    pub admission: AdmissionRes,
    pub patient: PatientRes,
    /// The occupied bed, absent once the admission has been discharged.
    pub bed: Option<BedRes>,
}

impl From<domain::AdmissionDetails> for AdmissionDetailsRes {
    fn from(details: domain::AdmissionDetails) -> Self {
        Self {
            admission: details.admission.into(),
            patient: details.patient.into(),
            bed: details.bed.map(Into::into),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScheduleAppointmentReq {
    pub patient_id: i64,
    pub professional_id: i64,
    pub scheduled_on: NaiveDate,
    pub scheduled_at: NaiveTime,
    pub kind: AppointmentKind,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAppointmentReq {
    pub status: Option<AppointmentStatus>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CancelAppointmentReq {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppointmentRes {
    pub id: i64,
    pub patient_id: i64,
    pub professional_id: i64,
    pub scheduled_on: NaiveDate,
    pub scheduled_at: NaiveTime,
    pub kind: AppointmentKind,
    pub status: AppointmentStatus,
    pub reason: Option<String>,
}

impl From<domain::Appointment> for AppointmentRes {
    fn from(appointment: domain::Appointment) -> Self {
        Self {
            id: appointment.id,
            patient_id: appointment.patient_id,
            professional_id: appointment.professional_id,
            scheduled_on: appointment.scheduled_on,
            scheduled_at: appointment.scheduled_at,
            kind: appointment.kind.into(),
            status: appointment.status.into(),
            reason: appointment.reason,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListAppointmentsRes {
    pub appointments: Vec<AppointmentRes>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRecordReq {
    pub patient_id: i64,
    pub professional_id: i64,
    pub content: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRecordReq {
    pub content: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignRecordReq {
    /// Confirmation secret mixed into the signature hash.
    pub secret: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecordRes {
    pub id: i64,
    pub patient_id: i64,
    pub professional_id: i64,
    pub content: String,
    pub version: u32,
    pub signed: bool,
    pub signature_hash: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,
}

impl From<domain::ClinicalRecord> for RecordRes {
    fn from(record: domain::ClinicalRecord) -> Self {
        Self {
            id: record.id,
            patient_id: record.patient_id,
            professional_id: record.professional_id,
            content: record.content,
            version: record.version,
            signed: record.signed,
            signature_hash: record.signature_hash,
            signed_at: record.signed_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListRecordsRes {
    pub records: Vec<RecordRes>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecordDetailsRes {
    pub record: RecordRes,
    pub patient: PatientRes,
    pub professional: ProfessionalRes,
}

impl From<domain::RecordDetails> for RecordDetailsRes {
    fn from(details: domain::RecordDetails) -> Self {
        Self {
            record: details.record.into(),
            patient: details.patient.into(),
            professional: details.professional.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecordExportRes {
    pub record: RecordRes,
    /// Path of the rendered document, served out-of-band.
    pub render_path: String,
}

impl From<domain::RecordExport> for RecordExportRes {
    fn from(export: domain::RecordExport) -> Self {
        Self {
            record: export.record.into(),
            render_path: export.render_path,
        }
    }
}
