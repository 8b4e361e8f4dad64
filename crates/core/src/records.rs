//! Versioned clinical records and their sign/unsign state machine.
//!
//! A record cycles between `Draft(v)` (unsigned) and `Signed(v)`
//! indefinitely: content updates bump the version by exactly 1 and always
//! retract any signature; signing stamps a hash and timestamp without
//! touching the version. There is no terminal state and no row is ever
//! deleted.
//!
//! History is the current rows with their version counters — prior content
//! is overwritten in place, as in the system this replaces. Re-signing an
//! already-signed record overwrites the stamp with a fresh hash and
//! timestamp for the same reason.

use crate::audit::AuditSink;
use crate::domain::{ClinicalRecord, EntityKind, Patient, Professional};
use crate::error::{WorkflowError, WorkflowResult};
use crate::signer::{Sha256Signer, Signer};
use crate::store::{NewClinicalRecord, RecordStore, StoreError, StoreTxn};
use chrono::Utc;
use std::sync::Arc;

/// Input for creating a clinical record.
///
/// Empty content is accepted: a record may legitimately start as a blank
/// draft and gain content through updates.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub patient_id: i64,
    pub professional_id: i64,
    pub content: String,
}

/// A record joined with its patient and authoring professional.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RecordDetails {
    pub record: ClinicalRecord,
    pub patient: Patient,
    pub professional: Professional,
}

/// A record plus an opaque reference to an out-of-band rendering.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RecordExport {
    pub record: ClinicalRecord,
    /// Path the caller can fetch to obtain a rendered document; no
    /// rendering happens here.
    pub render_path: String,
}

/// Orchestrates clinical record edits and signing.
#[derive(Debug)]
pub struct RecordService<S, G = Sha256Signer> {
    store: Arc<S>,
    signer: G,
    audit: AuditSink,
}

// Manual impl: a derive would demand `S: Clone`, but only the handle is
// cloned, never the store.
impl<S, G: Clone> Clone for RecordService<S, G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            signer: self.signer.clone(),
            audit: self.audit.clone(),
        }
    }
}

impl<S: RecordStore, G: Signer> RecordService<S, G> {
    pub fn new(store: Arc<S>, signer: G, audit: AuditSink) -> Self {
        Self {
            store,
            signer,
            audit,
        }
    }

    /// Creates a record at version 1, unsigned.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::NotFound`] if the patient or professional does not
    /// exist.
    pub fn create(&self, actor: &str, new: NewRecord) -> WorkflowResult<ClinicalRecord> {
        let mut txn = self.store.begin()?;

        if txn.patient(new.patient_id)?.is_none() {
            return Err(WorkflowError::not_found(EntityKind::Patient, new.patient_id));
        }
        if txn.professional(new.professional_id)?.is_none() {
            return Err(WorkflowError::not_found(
                EntityKind::Professional,
                new.professional_id,
            ));
        }

        let record_id = txn.insert_record(NewClinicalRecord {
            patient_id: new.patient_id,
            professional_id: new.professional_id,
            content: new.content,
            version: 1,
            signed: false,
            signature_hash: None,
            signed_at: None,
        })?;
        let record = txn.record(record_id)?.ok_or(StoreError::MissingRow {
            kind: EntityKind::ClinicalRecord,
            id: record_id,
        })?;
        txn.commit()?;

        tracing::info!(record_id, patient_id = record.patient_id, "clinical record created");
        self.audit
            .emit(actor, "record.create", EntityKind::ClinicalRecord, record_id);

        Ok(record)
    }

    /// Replaces the record's content: version increments by exactly 1 and
    /// any signature is retracted, whatever the prior signed state.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::NotFound`] if the record does not exist.
    pub fn update(
        &self,
        actor: &str,
        record_id: i64,
        content: String,
    ) -> WorkflowResult<ClinicalRecord> {
        let mut txn = self.store.begin()?;

        let mut record = txn
            .record(record_id)?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::ClinicalRecord, record_id))?;
        record.content = content;
        record.version += 1;
        record.signed = false;
        record.signature_hash = None;
        record.signed_at = None;
        txn.update_record(&record)?;
        txn.commit()?;

        tracing::info!(record_id, version = record.version, "clinical record updated");
        self.audit
            .emit(actor, "record.update", EntityKind::ClinicalRecord, record_id);

        Ok(record)
    }

    /// Signs the record: stamps a signature hash over the current content,
    /// the confirmation secret and the signing time. The version does not
    /// change. Signing an already-signed record overwrites the stamp with a
    /// fresh hash and timestamp.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::NotFound`] if the record does not exist.
    pub fn sign(&self, actor: &str, record_id: i64, secret: &str) -> WorkflowResult<ClinicalRecord> {
        let mut txn = self.store.begin()?;

        let mut record = txn
            .record(record_id)?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::ClinicalRecord, record_id))?;
        let signed_at = Utc::now();
        record.signature_hash = Some(self.signer.seal(&record.content, secret, signed_at));
        record.signed_at = Some(signed_at);
        record.signed = true;
        txn.update_record(&record)?;
        txn.commit()?;

        tracing::info!(record_id, version = record.version, "clinical record signed");
        self.audit
            .emit(actor, "record.sign", EntityKind::ClinicalRecord, record_id);

        Ok(record)
    }

    /// Returns the record joined with its patient and professional.
    pub fn get(&self, record_id: i64) -> WorkflowResult<RecordDetails> {
        let mut txn = self.store.begin()?;

        let record = txn
            .record(record_id)?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::ClinicalRecord, record_id))?;
        let patient = txn
            .patient(record.patient_id)?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::Patient, record.patient_id))?;
        let professional = txn.professional(record.professional_id)?.ok_or_else(|| {
            WorkflowError::not_found(EntityKind::Professional, record.professional_id)
        })?;

        Ok(RecordDetails {
            record,
            patient,
            professional,
        })
    }

    /// All record rows for a patient, in ascending id order. An unknown
    /// patient yields an empty list, not an error.
    pub fn history(&self, patient_id: i64) -> WorkflowResult<Vec<ClinicalRecord>> {
        let mut txn = self.store.begin()?;
        Ok(txn.records_by_patient(patient_id)?)
    }

    /// Every record in the store (administrative view).
    pub fn list(&self) -> WorkflowResult<Vec<ClinicalRecord>> {
        let mut txn = self.store.begin()?;
        Ok(txn.records()?)
    }

    /// Returns the record plus the opaque path of a rendering the caller can
    /// fetch out-of-band.
    pub fn export_reference(&self, record_id: i64) -> WorkflowResult<RecordExport> {
        let mut txn = self.store.begin()?;
        let record = txn
            .record(record_id)?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::ClinicalRecord, record_id))?;

        let render_path = format!("/records/{record_id}/pdf");
        Ok(RecordExport {
            record,
            render_path,
        })
    }
}
