//! Storage abstraction for the care workflows.
//!
//! The relational engine itself is a collaborator, not part of this crate;
//! workflows only need the typed operations below, with read-after-write
//! visibility inside a single transaction. Dropping a [`StoreTxn`] without
//! calling [`StoreTxn::commit`] rolls back every write made through it, which
//! is what keeps the two-step admit/discharge sequences atomic.

pub mod memory;

use crate::domain::{
    Admission, AdmissionStatus, Appointment, AppointmentKind, AppointmentStatus, Bed, BedKind,
    BedStatus, ClinicalRecord, EntityKind, Patient, Professional,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Errors raised by the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// An update targeted a row that no longer exists. This indicates a
    /// referential-integrity problem, not a caller mistake.
    #[error("{kind} row {id} vanished during update")]
    MissingRow { kind: EntityKind, id: i64 },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Insert payload for a patient row.
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub name: String,
    pub national_id: String,
    pub birth_date: Option<NaiveDate>,
}

/// Insert payload for a professional row.
#[derive(Debug, Clone)]
pub struct NewProfessional {
    pub name: String,
    pub registration: String,
    pub specialty: Option<String>,
}

/// Insert payload for a bed row.
#[derive(Debug, Clone)]
pub struct NewBed {
    pub number: String,
    pub kind: BedKind,
    pub unit: String,
    pub status: BedStatus,
    pub admission_id: Option<i64>,
}

/// Insert payload for an admission row.
#[derive(Debug, Clone)]
pub struct NewAdmission {
    pub patient_id: i64,
    pub admitted_at: DateTime<Utc>,
    pub reason: String,
    pub diagnosis: Option<String>,
    pub status: AdmissionStatus,
}

/// Insert payload for a clinical record row.
#[derive(Debug, Clone)]
pub struct NewClinicalRecord {
    pub patient_id: i64,
    pub professional_id: i64,
    pub content: String,
    pub version: u32,
    pub signed: bool,
    pub signature_hash: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,
}

/// Insert payload for an appointment row.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: i64,
    pub professional_id: i64,
    pub scheduled_on: NaiveDate,
    pub scheduled_at: NaiveTime,
    pub kind: AppointmentKind,
    pub status: AppointmentStatus,
    pub reason: Option<String>,
}

/// Handle to a record store capable of opening scoped transactions.
pub trait RecordStore: Send + Sync {
    type Txn<'a>: StoreTxn
    where
        Self: 'a;

    /// Opens a transaction. Writes become durable on
    /// [`StoreTxn::commit`]; dropping the transaction first rolls them back.
    fn begin(&self) -> StoreResult<Self::Txn<'_>>;
}

/// Typed operations available inside one store transaction.
///
/// Inserts return the newly assigned id. Updates address the row by the id
/// embedded in the entity and fail with [`StoreError::MissingRow`] if it is
/// gone. Listings are returned in ascending id order, which keeps repeated
/// queries stable.
pub trait StoreTxn {
    fn insert_patient(&mut self, patient: NewPatient) -> StoreResult<i64>;
    fn patient(&mut self, id: i64) -> StoreResult<Option<Patient>>;
    fn patients(&mut self) -> StoreResult<Vec<Patient>>;

    fn insert_professional(&mut self, professional: NewProfessional) -> StoreResult<i64>;
    fn professional(&mut self, id: i64) -> StoreResult<Option<Professional>>;
    fn professionals(&mut self) -> StoreResult<Vec<Professional>>;

    fn insert_bed(&mut self, bed: NewBed) -> StoreResult<i64>;
    fn bed(&mut self, id: i64) -> StoreResult<Option<Bed>>;
    fn beds(&mut self) -> StoreResult<Vec<Bed>>;
    fn beds_by_status(&mut self, status: BedStatus) -> StoreResult<Vec<Bed>>;
    fn beds_by_admission(&mut self, admission_id: i64) -> StoreResult<Vec<Bed>>;
    fn update_bed(&mut self, bed: &Bed) -> StoreResult<()>;

    fn insert_admission(&mut self, admission: NewAdmission) -> StoreResult<i64>;
    fn admission(&mut self, id: i64) -> StoreResult<Option<Admission>>;
    fn admissions(&mut self, status: Option<AdmissionStatus>) -> StoreResult<Vec<Admission>>;
    fn update_admission(&mut self, admission: &Admission) -> StoreResult<()>;

    fn insert_record(&mut self, record: NewClinicalRecord) -> StoreResult<i64>;
    fn record(&mut self, id: i64) -> StoreResult<Option<ClinicalRecord>>;
    fn records(&mut self) -> StoreResult<Vec<ClinicalRecord>>;
    fn records_by_patient(&mut self, patient_id: i64) -> StoreResult<Vec<ClinicalRecord>>;
    fn update_record(&mut self, record: &ClinicalRecord) -> StoreResult<()>;

    fn insert_appointment(&mut self, appointment: NewAppointment) -> StoreResult<i64>;
    fn appointment(&mut self, id: i64) -> StoreResult<Option<Appointment>>;
    fn appointments_by_patient(&mut self, patient_id: i64) -> StoreResult<Vec<Appointment>>;
    fn update_appointment(&mut self, appointment: &Appointment) -> StoreResult<()>;

    /// Makes every write in this transaction durable.
    fn commit(self) -> StoreResult<()>
    where
        Self: Sized;
}
