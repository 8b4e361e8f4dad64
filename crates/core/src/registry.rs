//! Master data: patients, professionals and beds.
//!
//! These are the reference rows the care workflows join against. Creation
//! enforces the uniqueness rules (national id, professional registration,
//! bed number) that the relational schema would otherwise carry.

use crate::audit::AuditSink;
use crate::domain::{Bed, BedKind, BedStatus, EntityKind, Patient, Professional};
use crate::error::{WorkflowError, WorkflowResult};
use crate::store::{NewBed, NewPatient, NewProfessional, RecordStore, StoreError, StoreTxn};
use chrono::NaiveDate;
use std::sync::Arc;
use vidaplus_types::NonEmptyText;

/// Input for registering a patient.
#[derive(Debug, Clone)]
pub struct NewPatientRequest {
    pub name: String,
    pub national_id: String,
    pub birth_date: Option<NaiveDate>,
}

/// Input for registering a care professional.
#[derive(Debug, Clone)]
pub struct NewProfessionalRequest {
    pub name: String,
    pub registration: String,
    pub specialty: Option<String>,
}

/// Input for registering a bed. New beds always start `available` and
/// unlinked; occupancy only ever changes through the admission workflow.
#[derive(Debug, Clone)]
pub struct NewBedRequest {
    pub number: String,
    pub kind: BedKind,
    pub unit: String,
}

/// Maintains the master data the workflows depend on.
#[derive(Debug)]
pub struct RegistryService<S> {
    store: Arc<S>,
    audit: AuditSink,
}

// Manual impl: a derive would demand `S: Clone`, but only the handle is
// cloned, never the store.
impl<S> Clone for RegistryService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            audit: self.audit.clone(),
        }
    }
}

impl<S: RecordStore> RegistryService<S> {
    pub fn new(store: Arc<S>, audit: AuditSink) -> Self {
        Self { store, audit }
    }

    /// Registers a patient.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::Validation`] if the name or national id is empty
    /// - [`WorkflowError::Conflict`] if a patient with the same national id
    ///   already exists
    pub fn create_patient(&self, actor: &str, new: NewPatientRequest) -> WorkflowResult<Patient> {
        let name = NonEmptyText::new(&new.name)
            .map_err(|_| WorkflowError::Validation("patient name is required".into()))?;
        let national_id = NonEmptyText::new(&new.national_id)
            .map_err(|_| WorkflowError::Validation("patient national id is required".into()))?;

        let mut txn = self.store.begin()?;

        if txn
            .patients()?
            .iter()
            .any(|patient| patient.national_id == national_id.as_str())
        {
            return Err(WorkflowError::Conflict(format!(
                "patient with national id {national_id} already registered"
            )));
        }

        let patient_id = txn.insert_patient(NewPatient {
            name: name.into_inner(),
            national_id: national_id.into_inner(),
            birth_date: new.birth_date,
        })?;
        let patient = txn.patient(patient_id)?.ok_or(StoreError::MissingRow {
            kind: EntityKind::Patient,
            id: patient_id,
        })?;
        txn.commit()?;

        tracing::info!(patient_id, "patient registered");
        self.audit
            .emit(actor, "patient.create", EntityKind::Patient, patient_id);

        Ok(patient)
    }

    pub fn list_patients(&self) -> WorkflowResult<Vec<Patient>> {
        let mut txn = self.store.begin()?;
        Ok(txn.patients()?)
    }

    /// Registers a care professional.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::Validation`] if the name or registration is empty
    /// - [`WorkflowError::Conflict`] if the registration is already taken
    pub fn create_professional(
        &self,
        actor: &str,
        new: NewProfessionalRequest,
    ) -> WorkflowResult<Professional> {
        let name = NonEmptyText::new(&new.name)
            .map_err(|_| WorkflowError::Validation("professional name is required".into()))?;
        let registration = NonEmptyText::new(&new.registration).map_err(|_| {
            WorkflowError::Validation("professional registration is required".into())
        })?;

        let mut txn = self.store.begin()?;

        if txn
            .professionals()?
            .iter()
            .any(|professional| professional.registration == registration.as_str())
        {
            return Err(WorkflowError::Conflict(format!(
                "registration {registration} already taken"
            )));
        }

        let professional_id = txn.insert_professional(NewProfessional {
            name: name.into_inner(),
            registration: registration.into_inner(),
            specialty: new.specialty.filter(|specialty| !specialty.trim().is_empty()),
        })?;
        let professional = txn
            .professional(professional_id)?
            .ok_or(StoreError::MissingRow {
                kind: EntityKind::Professional,
                id: professional_id,
            })?;
        txn.commit()?;

        tracing::info!(professional_id, "professional registered");
        self.audit.emit(
            actor,
            "professional.create",
            EntityKind::Professional,
            professional_id,
        );

        Ok(professional)
    }

    pub fn list_professionals(&self) -> WorkflowResult<Vec<Professional>> {
        let mut txn = self.store.begin()?;
        Ok(txn.professionals()?)
    }

    /// Registers a bed, `available` and unlinked.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::Validation`] if the number or unit is empty
    /// - [`WorkflowError::Conflict`] if a bed with the same number already
    ///   exists
    pub fn create_bed(&self, actor: &str, new: NewBedRequest) -> WorkflowResult<Bed> {
        let number = NonEmptyText::new(&new.number)
            .map_err(|_| WorkflowError::Validation("bed number is required".into()))?;
        let unit = NonEmptyText::new(&new.unit)
            .map_err(|_| WorkflowError::Validation("bed unit is required".into()))?;

        let mut txn = self.store.begin()?;

        if txn.beds()?.iter().any(|bed| bed.number == number.as_str()) {
            return Err(WorkflowError::Conflict(format!(
                "bed {number} already registered"
            )));
        }

        let bed_id = txn.insert_bed(NewBed {
            number: number.into_inner(),
            kind: new.kind,
            unit: unit.into_inner(),
            status: BedStatus::Available,
            admission_id: None,
        })?;
        let bed = txn.bed(bed_id)?.ok_or(StoreError::MissingRow {
            kind: EntityKind::Bed,
            id: bed_id,
        })?;
        txn.commit()?;

        tracing::info!(bed_id, number = %bed.number, "bed registered");
        self.audit.emit(actor, "bed.create", EntityKind::Bed, bed_id);

        Ok(bed)
    }

    pub fn list_beds(&self) -> WorkflowResult<Vec<Bed>> {
        let mut txn = self.store.begin()?;
        Ok(txn.beds()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn service() -> RegistryService<MemoryStore> {
        RegistryService::new(Arc::new(MemoryStore::new()), AuditSink::disabled())
    }

    #[test]
    fn create_patient_assigns_id_and_keeps_fields() {
        let svc = service();
        let patient = svc
            .create_patient(
                "reception",
                NewPatientRequest {
                    name: "  Ana Souza  ".to_string(),
                    national_id: "111.222.333-44".to_string(),
                    birth_date: NaiveDate::from_ymd_opt(1990, 5, 17),
                },
            )
            .expect("create should succeed");

        assert_eq!(patient.id, 1);
        assert_eq!(patient.name, "Ana Souza", "name is stored trimmed");
        assert_eq!(patient.national_id, "111.222.333-44");
        assert_eq!(patient.birth_date, NaiveDate::from_ymd_opt(1990, 5, 17));
    }

    #[test]
    fn duplicate_national_id_is_a_conflict() {
        let svc = service();
        let request = NewPatientRequest {
            name: "Ana Souza".to_string(),
            national_id: "111.222.333-44".to_string(),
            birth_date: None,
        };
        svc.create_patient("reception", request.clone())
            .expect("first create should succeed");

        let err = svc
            .create_patient("reception", request)
            .expect_err("duplicate should fail");
        assert!(matches!(err, WorkflowError::Conflict(_)));
        assert_eq!(
            svc.list_patients().expect("list should succeed").len(),
            1,
            "rejected duplicate must not persist"
        );
    }

    #[test]
    fn blank_patient_fields_are_rejected() {
        let svc = service();

        let err = svc
            .create_patient(
                "reception",
                NewPatientRequest {
                    name: "   ".to_string(),
                    national_id: "111.222.333-44".to_string(),
                    birth_date: None,
                },
            )
            .expect_err("blank name should fail");
        assert!(matches!(err, WorkflowError::Validation(_)));

        let err = svc
            .create_patient(
                "reception",
                NewPatientRequest {
                    name: "Ana Souza".to_string(),
                    national_id: String::new(),
                    birth_date: None,
                },
            )
            .expect_err("blank national id should fail");
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[test]
    fn duplicate_registration_is_a_conflict() {
        let svc = service();
        svc.create_professional(
            "admin",
            NewProfessionalRequest {
                name: "Dr. Lima".to_string(),
                registration: "CRM-12345".to_string(),
                specialty: Some("cardiology".to_string()),
            },
        )
        .expect("first create should succeed");

        let err = svc
            .create_professional(
                "admin",
                NewProfessionalRequest {
                    name: "Dr. Prado".to_string(),
                    registration: "CRM-12345".to_string(),
                    specialty: None,
                },
            )
            .expect_err("duplicate registration should fail");
        assert!(matches!(err, WorkflowError::Conflict(_)));
    }

    #[test]
    fn blank_specialty_is_stored_as_none() {
        let svc = service();
        let professional = svc
            .create_professional(
                "admin",
                NewProfessionalRequest {
                    name: "Dr. Lima".to_string(),
                    registration: "CRM-12345".to_string(),
                    specialty: Some("   ".to_string()),
                },
            )
            .expect("create should succeed");
        assert_eq!(professional.specialty, None);
    }

    #[test]
    fn new_beds_start_available_and_unlinked() {
        let svc = service();
        let bed = svc
            .create_bed(
                "admin",
                NewBedRequest {
                    number: "A-101".to_string(),
                    kind: BedKind::Icu,
                    unit: "ICU".to_string(),
                },
            )
            .expect("create should succeed");

        assert_eq!(bed.status, BedStatus::Available);
        assert_eq!(bed.admission_id, None);
        assert_eq!(bed.kind, BedKind::Icu);
    }

    #[test]
    fn duplicate_bed_number_is_a_conflict() {
        let svc = service();
        svc.create_bed(
            "admin",
            NewBedRequest {
                number: "A-101".to_string(),
                kind: BedKind::Ward,
                unit: "Ward 2".to_string(),
            },
        )
        .expect("first create should succeed");

        let err = svc
            .create_bed(
                "admin",
                NewBedRequest {
                    number: "A-101".to_string(),
                    kind: BedKind::Icu,
                    unit: "ICU".to_string(),
                },
            )
            .expect_err("duplicate number should fail");
        assert!(matches!(err, WorkflowError::Conflict(_)));
    }

    #[test]
    fn service_clones_share_the_store() {
        let svc = service();
        let cloned = svc.clone();

        cloned
            .create_patient(
                "reception",
                NewPatientRequest {
                    name: "Ana Souza".to_string(),
                    national_id: "111.222.333-44".to_string(),
                    birth_date: None,
                },
            )
            .expect("create via clone should succeed");

        assert_eq!(svc.list_patients().expect("list should succeed").len(), 1);
    }

    #[test]
    fn registrations_emit_audit_events() {
        let (sink, rx) = AuditSink::channel();
        let svc = RegistryService::new(Arc::new(MemoryStore::new()), sink);

        svc.create_patient(
            "reception",
            NewPatientRequest {
                name: "Ana Souza".to_string(),
                national_id: "111.222.333-44".to_string(),
                birth_date: None,
            },
        )
        .expect("create should succeed");
        svc.create_bed(
            "admin",
            NewBedRequest {
                number: "A-101".to_string(),
                kind: BedKind::Ward,
                unit: "Ward 2".to_string(),
            },
        )
        .expect("create should succeed");

        let actions: Vec<String> = rx.try_iter().map(|event| event.action).collect();
        assert_eq!(actions, vec!["patient.create", "bed.create"]);
    }
}
