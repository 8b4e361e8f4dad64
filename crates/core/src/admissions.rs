//! Admission lifecycle management.
//!
//! This module owns the admission↔bed pairing invariant: a bed is
//! `occupied` exactly while it back-references an admission whose status is
//! `admitted`. Admit and discharge each run inside one store transaction, so
//! the admission row and the bed row can never drift apart. Within the
//! transaction, discharge updates the admission before releasing the bed: if
//! the sequence fails part-way the bed stays marked occupied instead of
//! being freed under an admission that is secretly still active.

use crate::audit::AuditSink;
use crate::domain::{
    Admission, AdmissionDetails, AdmissionStatus, Bed, BedStatus, EntityKind,
};
use crate::error::{WorkflowError, WorkflowResult};
use crate::store::{NewAdmission, RecordStore, StoreTxn};
use chrono::Utc;
use std::sync::Arc;
use vidaplus_types::NonEmptyText;

/// Input for admitting a patient into a bed.
#[derive(Debug, Clone)]
pub struct AdmitRequest {
    pub patient_id: i64,
    pub reason: String,
    pub diagnosis: Option<String>,
    pub bed_id: i64,
}

/// Orchestrates admissions and bed occupancy.
#[derive(Debug)]
pub struct AdmissionService<S> {
    store: Arc<S>,
    audit: AuditSink,
}

// Manual impl: a derive would demand `S: Clone`, but only the handle is
// cloned, never the store.
impl<S> Clone for AdmissionService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            audit: self.audit.clone(),
        }
    }
}

impl<S: RecordStore> AdmissionService<S> {
    pub fn new(store: Arc<S>, audit: AuditSink) -> Self {
        Self { store, audit }
    }

    /// Admits a patient into a bed.
    ///
    /// Creates an admission with status `admitted` and flips the targeted
    /// bed to `occupied` with a back-reference to the new admission, both in
    /// one transaction. Returns the new admission's id.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::Validation`] if the reason is empty or
    ///   whitespace-only
    /// - [`WorkflowError::NotFound`] if the patient or bed does not exist
    /// - [`WorkflowError::Conflict`] if the bed is not `available`
    ///   (occupied or under maintenance)
    /// - [`WorkflowError::Storage`] if a write fails; nothing is persisted
    pub fn admit(&self, actor: &str, request: AdmitRequest) -> WorkflowResult<i64> {
        let reason = NonEmptyText::new(&request.reason)
            .map_err(|_| WorkflowError::Validation("admission reason is required".into()))?;

        let mut txn = self.store.begin()?;

        if txn.patient(request.patient_id)?.is_none() {
            return Err(WorkflowError::not_found(
                EntityKind::Patient,
                request.patient_id,
            ));
        }

        let mut bed = txn
            .bed(request.bed_id)?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::Bed, request.bed_id))?;
        if bed.status != BedStatus::Available {
            return Err(WorkflowError::Conflict(format!(
                "bed {} is not available",
                bed.number
            )));
        }

        let admission_id = txn.insert_admission(NewAdmission {
            patient_id: request.patient_id,
            admitted_at: Utc::now(),
            reason: reason.into_inner(),
            diagnosis: request.diagnosis,
            status: AdmissionStatus::Admitted,
        })?;

        bed.status = BedStatus::Occupied;
        bed.admission_id = Some(admission_id);
        txn.update_bed(&bed)?;
        txn.commit()?;

        tracing::info!(
            admission_id,
            patient_id = request.patient_id,
            bed_id = request.bed_id,
            "patient admitted"
        );
        self.audit
            .emit(actor, "admission.admit", EntityKind::Admission, admission_id);

        Ok(admission_id)
    }

    /// Discharges an admission and releases its bed.
    ///
    /// Sets the admission to `discharged` with the discharge timestamp, then
    /// frees every bed back-referencing it, all in one transaction.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::NotFound`] if no admission has that id
    /// - [`WorkflowError::Conflict`] if the admission is no longer
    ///   `admitted` — a second discharge is rejected, not replayed
    /// - [`WorkflowError::Storage`] if a write fails; nothing is persisted
    pub fn discharge(&self, actor: &str, admission_id: i64) -> WorkflowResult<Admission> {
        let mut txn = self.store.begin()?;

        let mut admission = txn
            .admission(admission_id)?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::Admission, admission_id))?;
        if admission.status != AdmissionStatus::Admitted {
            return Err(WorkflowError::Conflict(format!(
                "admission {admission_id} already discharged"
            )));
        }

        admission.status = AdmissionStatus::Discharged;
        admission.discharged_at = Some(Utc::now());
        txn.update_admission(&admission)?;

        for mut bed in txn.beds_by_admission(admission_id)? {
            bed.status = BedStatus::Available;
            bed.admission_id = None;
            txn.update_bed(&bed)?;
        }
        txn.commit()?;

        tracing::info!(admission_id, "patient discharged");
        self.audit.emit(
            actor,
            "admission.discharge",
            EntityKind::Admission,
            admission_id,
        );

        Ok(admission)
    }

    /// Returns the admission joined with its patient summary and current bed.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::NotFound`] if the admission does not exist.
    pub fn details(&self, admission_id: i64) -> WorkflowResult<AdmissionDetails> {
        let mut txn = self.store.begin()?;

        let admission = txn
            .admission(admission_id)?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::Admission, admission_id))?;
        let patient = txn
            .patient(admission.patient_id)?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::Patient, admission.patient_id))?;
        let bed = txn.beds_by_admission(admission_id)?.into_iter().next();

        Ok(AdmissionDetails {
            admission,
            patient,
            bed,
        })
    }

    /// Lists admissions, optionally filtered to one status, in ascending id
    /// order.
    pub fn list(&self, status: Option<AdmissionStatus>) -> WorkflowResult<Vec<Admission>> {
        let mut txn = self.store.begin()?;
        Ok(txn.admissions(status)?)
    }

    /// Lists beds whose status is `available`.
    pub fn available_beds(&self) -> WorkflowResult<Vec<Bed>> {
        let mut txn = self.store.begin()?;
        Ok(txn.beds_by_status(BedStatus::Available)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BedKind;
    use crate::store::{memory::MemoryStore, NewBed, NewPatient};

    fn seed_patient(store: &MemoryStore, name: &str, national_id: &str) -> i64 {
        let mut txn = store.begin().expect("begin should succeed");
        let id = txn
            .insert_patient(NewPatient {
                name: name.to_string(),
                national_id: national_id.to_string(),
                birth_date: None,
            })
            .expect("insert patient should succeed");
        txn.commit().expect("commit should succeed");
        id
    }

    fn seed_bed(store: &MemoryStore, number: &str, status: BedStatus) -> i64 {
        let mut txn = store.begin().expect("begin should succeed");
        let id = txn
            .insert_bed(NewBed {
                number: number.to_string(),
                kind: BedKind::Ward,
                unit: "General".to_string(),
                status,
                admission_id: None,
            })
            .expect("insert bed should succeed");
        txn.commit().expect("commit should succeed");
        id
    }

    fn bed_by_id(store: &MemoryStore, id: i64) -> Bed {
        let mut txn = store.begin().expect("begin should succeed");
        txn.bed(id)
            .expect("read should succeed")
            .expect("bed should exist")
    }

    fn service(store: &Arc<MemoryStore>) -> AdmissionService<MemoryStore> {
        AdmissionService::new(store.clone(), AuditSink::disabled())
    }

    /// A bed is occupied exactly while it references an admitted admission.
    fn assert_bed_invariant(store: &MemoryStore) {
        let mut txn = store.begin().expect("begin should succeed");
        let beds = txn.beds().expect("read should succeed");
        for bed in beds {
            match bed.admission_id {
                Some(admission_id) => {
                    assert_eq!(
                        bed.status,
                        BedStatus::Occupied,
                        "bed {} references an admission but is not occupied",
                        bed.number
                    );
                    let admission = txn
                        .admission(admission_id)
                        .expect("read should succeed")
                        .expect("referenced admission should exist");
                    assert_eq!(
                        admission.status,
                        AdmissionStatus::Admitted,
                        "bed {} references a non-admitted admission",
                        bed.number
                    );
                }
                None => assert_ne!(
                    bed.status,
                    BedStatus::Occupied,
                    "bed {} is occupied without an admission reference",
                    bed.number
                ),
            }
        }
    }

    #[test]
    fn admit_creates_admission_and_occupies_bed() {
        let store = Arc::new(MemoryStore::new());
        let patient_id = seed_patient(&store, "Ana Souza", "111.222.333-44");
        let bed_id = seed_bed(&store, "101", BedStatus::Available);
        let svc = service(&store);

        let admission_id = svc
            .admit(
                "dr-lima",
                AdmitRequest {
                    patient_id,
                    reason: "emergency surgery".to_string(),
                    diagnosis: None,
                    bed_id,
                },
            )
            .expect("admit should succeed");

        let details = svc.details(admission_id).expect("details should succeed");
        assert_eq!(details.admission.status, AdmissionStatus::Admitted);
        assert_eq!(details.admission.reason, "emergency surgery");
        assert!(details.admission.discharged_at.is_none());
        assert_eq!(details.patient.id, patient_id);

        let bed = bed_by_id(&store, bed_id);
        assert_eq!(bed.status, BedStatus::Occupied);
        assert_eq!(bed.admission_id, Some(admission_id));
        assert_bed_invariant(&store);
    }

    #[test]
    fn admit_rejects_empty_reason() {
        let store = Arc::new(MemoryStore::new());
        let patient_id = seed_patient(&store, "Ana Souza", "111.222.333-44");
        let bed_id = seed_bed(&store, "101", BedStatus::Available);
        let svc = service(&store);

        let err = svc
            .admit(
                "dr-lima",
                AdmitRequest {
                    patient_id,
                    reason: "   ".to_string(),
                    diagnosis: None,
                    bed_id,
                },
            )
            .expect_err("admit should fail");
        assert!(matches!(err, WorkflowError::Validation(_)));

        assert!(
            svc.list(None).expect("list should succeed").is_empty(),
            "no admission should be created"
        );
    }

    #[test]
    fn admit_into_occupied_bed_conflicts_without_creating_an_admission() {
        let store = Arc::new(MemoryStore::new());
        let first = seed_patient(&store, "Ana Souza", "111.222.333-44");
        let second = seed_patient(&store, "Bruno Dias", "555.666.777-88");
        let bed_id = seed_bed(&store, "205", BedStatus::Available);
        let svc = service(&store);

        let occupying = svc
            .admit(
                "dr-lima",
                AdmitRequest {
                    patient_id: first,
                    reason: "observation".to_string(),
                    diagnosis: None,
                    bed_id,
                },
            )
            .expect("first admit should succeed");

        let err = svc
            .admit(
                "dr-lima",
                AdmitRequest {
                    patient_id: second,
                    reason: "observation".to_string(),
                    diagnosis: None,
                    bed_id,
                },
            )
            .expect_err("second admit should fail");
        assert!(matches!(err, WorkflowError::Conflict(_)));

        let admissions = svc.list(None).expect("list should succeed");
        assert_eq!(admissions.len(), 1, "conflict must not persist an admission");

        let bed = bed_by_id(&store, bed_id);
        assert_eq!(bed.admission_id, Some(occupying));
        assert_bed_invariant(&store);
    }

    #[test]
    fn admit_into_maintenance_bed_conflicts() {
        let store = Arc::new(MemoryStore::new());
        let patient_id = seed_patient(&store, "Ana Souza", "111.222.333-44");
        let bed_id = seed_bed(&store, "301", BedStatus::Maintenance);
        let svc = service(&store);

        let err = svc
            .admit(
                "dr-lima",
                AdmitRequest {
                    patient_id,
                    reason: "observation".to_string(),
                    diagnosis: None,
                    bed_id,
                },
            )
            .expect_err("admit should fail");
        assert!(matches!(err, WorkflowError::Conflict(_)));
    }

    #[test]
    fn admit_unknown_patient_or_bed_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let patient_id = seed_patient(&store, "Ana Souza", "111.222.333-44");
        let bed_id = seed_bed(&store, "101", BedStatus::Available);
        let svc = service(&store);

        let err = svc
            .admit(
                "dr-lima",
                AdmitRequest {
                    patient_id: 999,
                    reason: "observation".to_string(),
                    diagnosis: None,
                    bed_id,
                },
            )
            .expect_err("admit should fail");
        assert!(matches!(
            err,
            WorkflowError::NotFound {
                kind: EntityKind::Patient,
                id: 999
            }
        ));

        let err = svc
            .admit(
                "dr-lima",
                AdmitRequest {
                    patient_id,
                    reason: "observation".to_string(),
                    diagnosis: None,
                    bed_id: 999,
                },
            )
            .expect_err("admit should fail");
        assert!(matches!(
            err,
            WorkflowError::NotFound {
                kind: EntityKind::Bed,
                id: 999
            }
        ));
    }

    #[test]
    fn admit_rolls_back_admission_if_bed_write_fails() {
        let store = Arc::new(MemoryStore::new());
        let patient_id = seed_patient(&store, "Ana Souza", "111.222.333-44");
        let bed_id = seed_bed(&store, "101", BedStatus::Available);
        let svc = service(&store);

        // Let the admission insert through, fail the bed update after it.
        store.fail_after_writes(1);
        let err = svc
            .admit(
                "dr-lima",
                AdmitRequest {
                    patient_id,
                    reason: "emergency surgery".to_string(),
                    diagnosis: None,
                    bed_id,
                },
            )
            .expect_err("admit should fail");
        assert!(matches!(err, WorkflowError::Storage(_)));

        assert!(
            svc.list(None).expect("list should succeed").is_empty(),
            "failed admit must not leave an admission row"
        );
        let bed = bed_by_id(&store, bed_id);
        assert_eq!(bed.status, BedStatus::Available);
        assert_eq!(bed.admission_id, None);
    }

    #[test]
    fn discharge_frees_the_bed_and_stamps_the_admission() {
        let store = Arc::new(MemoryStore::new());
        let patient_id = seed_patient(&store, "Ana Souza", "111.222.333-44");
        let bed_id = seed_bed(&store, "101", BedStatus::Available);
        let svc = service(&store);

        let admission_id = svc
            .admit(
                "dr-lima",
                AdmitRequest {
                    patient_id,
                    reason: "emergency surgery".to_string(),
                    diagnosis: Some("appendicitis".to_string()),
                    bed_id,
                },
            )
            .expect("admit should succeed");

        let discharged = svc
            .discharge("dr-lima", admission_id)
            .expect("discharge should succeed");
        assert_eq!(discharged.status, AdmissionStatus::Discharged);
        assert!(discharged.discharged_at.is_some());

        let bed = bed_by_id(&store, bed_id);
        assert_eq!(bed.status, BedStatus::Available);
        assert_eq!(bed.admission_id, None);
        assert_bed_invariant(&store);
    }

    #[test]
    fn discharge_unknown_admission_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);

        let err = svc
            .discharge("dr-lima", 42)
            .expect_err("discharge should fail");
        assert!(matches!(
            err,
            WorkflowError::NotFound {
                kind: EntityKind::Admission,
                id: 42
            }
        ));
    }

    #[test]
    fn discharge_twice_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let patient_id = seed_patient(&store, "Ana Souza", "111.222.333-44");
        let bed_id = seed_bed(&store, "101", BedStatus::Available);
        let svc = service(&store);

        let admission_id = svc
            .admit(
                "dr-lima",
                AdmitRequest {
                    patient_id,
                    reason: "observation".to_string(),
                    diagnosis: None,
                    bed_id,
                },
            )
            .expect("admit should succeed");
        svc.discharge("dr-lima", admission_id)
            .expect("first discharge should succeed");

        let err = svc
            .discharge("dr-lima", admission_id)
            .expect_err("second discharge should fail");
        assert!(matches!(err, WorkflowError::Conflict(_)));
    }

    #[test]
    fn list_filters_by_status() {
        let store = Arc::new(MemoryStore::new());
        let patient_id = seed_patient(&store, "Ana Souza", "111.222.333-44");
        let first_bed = seed_bed(&store, "101", BedStatus::Available);
        let second_bed = seed_bed(&store, "102", BedStatus::Available);
        let svc = service(&store);

        let first = svc
            .admit(
                "dr-lima",
                AdmitRequest {
                    patient_id,
                    reason: "observation".to_string(),
                    diagnosis: None,
                    bed_id: first_bed,
                },
            )
            .expect("admit should succeed");
        svc.discharge("dr-lima", first)
            .expect("discharge should succeed");
        let second = svc
            .admit(
                "dr-lima",
                AdmitRequest {
                    patient_id,
                    reason: "relapse".to_string(),
                    diagnosis: None,
                    bed_id: second_bed,
                },
            )
            .expect("admit should succeed");

        let all = svc.list(None).expect("list should succeed");
        assert_eq!(all.len(), 2);
        assert!(all[0].id < all[1].id, "listing should be stably ordered");

        let admitted = svc
            .list(Some(AdmissionStatus::Admitted))
            .expect("list should succeed");
        assert_eq!(admitted.len(), 1);
        assert_eq!(admitted[0].id, second);

        let discharged = svc
            .list(Some(AdmissionStatus::Discharged))
            .expect("list should succeed");
        assert_eq!(discharged.len(), 1);
        assert_eq!(discharged[0].id, first);
    }

    #[test]
    fn available_beds_excludes_occupied_and_maintenance() {
        let store = Arc::new(MemoryStore::new());
        let patient_id = seed_patient(&store, "Ana Souza", "111.222.333-44");
        let free = seed_bed(&store, "101", BedStatus::Available);
        let taken = seed_bed(&store, "102", BedStatus::Available);
        seed_bed(&store, "103", BedStatus::Maintenance);
        let svc = service(&store);

        svc.admit(
            "dr-lima",
            AdmitRequest {
                patient_id,
                reason: "observation".to_string(),
                diagnosis: None,
                bed_id: taken,
            },
        )
        .expect("admit should succeed");

        let available = svc.available_beds().expect("listing should succeed");
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, free);
    }

    #[test]
    fn details_includes_patient_and_current_bed() {
        let store = Arc::new(MemoryStore::new());
        let patient_id = seed_patient(&store, "Carla Nunes", "999.888.777-66");
        let bed_id = seed_bed(&store, "110", BedStatus::Available);
        let svc = service(&store);

        let admission_id = svc
            .admit(
                "dr-lima",
                AdmitRequest {
                    patient_id,
                    reason: "observation".to_string(),
                    diagnosis: None,
                    bed_id,
                },
            )
            .expect("admit should succeed");

        let details = svc.details(admission_id).expect("details should succeed");
        assert_eq!(details.patient.name, "Carla Nunes");
        let bed = details.bed.expect("bed should be joined");
        assert_eq!(bed.id, bed_id);

        svc.discharge("dr-lima", admission_id)
            .expect("discharge should succeed");
        let details = svc.details(admission_id).expect("details should succeed");
        assert!(details.bed.is_none(), "released bed should not be joined");
    }

    #[test]
    fn service_clones_share_the_store() {
        // The store itself is not Clone; cloning the service must only
        // clone the handle.
        fn assert_cloneable<T: Clone>(value: &T) -> T {
            value.clone()
        }

        let store = Arc::new(MemoryStore::new());
        let patient_id = seed_patient(&store, "Ana Souza", "111.222.333-44");
        let bed_id = seed_bed(&store, "101", BedStatus::Available);
        let svc = service(&store);
        let cloned = assert_cloneable(&svc);

        let admission_id = cloned
            .admit(
                "dr-lima",
                AdmitRequest {
                    patient_id,
                    reason: "observation".to_string(),
                    diagnosis: None,
                    bed_id,
                },
            )
            .expect("admit via clone should succeed");

        let details = svc.details(admission_id).expect("details should succeed");
        assert_eq!(details.admission.id, admission_id);
    }

    #[test]
    fn mutations_emit_audit_events() {
        let store = Arc::new(MemoryStore::new());
        let patient_id = seed_patient(&store, "Ana Souza", "111.222.333-44");
        let bed_id = seed_bed(&store, "101", BedStatus::Available);
        let (sink, rx) = AuditSink::channel();
        let svc = AdmissionService::new(store.clone(), sink);

        let admission_id = svc
            .admit(
                "dr-lima",
                AdmitRequest {
                    patient_id,
                    reason: "observation".to_string(),
                    diagnosis: None,
                    bed_id,
                },
            )
            .expect("admit should succeed");
        svc.discharge("dr-lima", admission_id)
            .expect("discharge should succeed");

        let first = rx.try_recv().expect("admit event should be queued");
        assert_eq!(first.action, "admission.admit");
        assert_eq!(first.entity_id, admission_id);
        let second = rx.try_recv().expect("discharge event should be queued");
        assert_eq!(second.action, "admission.discharge");
        assert_eq!(second.actor_id, "dr-lima");
    }
}
