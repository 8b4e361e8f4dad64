//! # VidaPlus Core
//!
//! Care-workflow logic for the VidaPlus hospital management service.
//!
//! This crate contains the pure domain workflows:
//! - Admission lifecycle: admitting a patient into a bed, discharging and
//!   releasing the bed, listing admissions and available beds
//! - Clinical records: versioned content edits and the sign/unsign state
//!   machine with a hash-stamp signature
//! - Outpatient appointments: scheduling, partial updates and cancellation
//! - Administrative registry of patients, professionals and beds
//!
//! State lives exclusively in a [`store::RecordStore`]; services hold no
//! per-entity state between calls. Every multi-row mutation runs inside a
//! scoped store transaction, so a partial failure rolls back rather than
//! leaving a bed and its admission inconsistent.
//!
//! **No API concerns**: HTTP routing, identity and status-code mapping belong
//! in `api-rest`.

pub mod admissions;
pub mod appointments;
pub mod audit;
pub mod domain;
pub mod error;
pub mod records;
pub mod registry;
pub mod signer;
pub mod store;

pub use admissions::{AdmissionService, AdmitRequest};
pub use appointments::{AppointmentService, AppointmentUpdate, ScheduleRequest};
pub use audit::{AuditEvent, AuditSink};
pub use domain::{
    Admission, AdmissionDetails, AdmissionStatus, Appointment, AppointmentKind, AppointmentStatus,
    Bed, BedKind, BedStatus, ClinicalRecord, EntityKind, Patient, Professional,
};
pub use error::{WorkflowError, WorkflowResult};
pub use records::{NewRecord, RecordDetails, RecordExport, RecordService};
pub use registry::{NewBedRequest, NewPatientRequest, NewProfessionalRequest, RegistryService};
pub use signer::{Sha256Signer, Signer};
pub use store::{memory::MemoryStore, RecordStore, StoreError, StoreTxn};
