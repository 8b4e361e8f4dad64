//! In-process record store.
//!
//! `MemoryStore` keeps all tables behind one mutex. A transaction holds the
//! lock for its whole lifetime, so read-modify-write sequences on the same
//! entities never interleave; rollback is a snapshot taken at `begin` and
//! restored when the transaction is dropped uncommitted.

use crate::domain::{
    Admission, AdmissionStatus, Appointment, Bed, BedStatus, ClinicalRecord, EntityKind, Patient,
    Professional,
};
use crate::store::{
    NewAdmission, NewAppointment, NewBed, NewClinicalRecord, NewPatient, NewProfessional,
    RecordStore, StoreError, StoreResult, StoreTxn,
};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[cfg(test)]
use std::sync::atomic::{AtomicI64, Ordering};

/// One table of rows keyed by an auto-incrementing id.
#[derive(Debug, Clone)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Clone> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.insert(id, build(id));
        id
    }

    fn get(&self, id: i64) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    /// All rows in ascending id order.
    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    fn replace(&mut self, id: i64, row: T) -> bool {
        match self.rows.get_mut(&id) {
            Some(slot) => {
                *slot = row;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Tables {
    patients: Table<Patient>,
    professionals: Table<Professional>,
    beds: Table<Bed>,
    admissions: Table<Admission>,
    records: Table<ClinicalRecord>,
    appointments: Table<Appointment>,
}

/// Mutex-guarded in-memory store.
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
    /// Negative = disabled; otherwise the number of writes still allowed
    /// before one forced failure.
    #[cfg(test)]
    fail_after_writes: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            inner: Mutex::default(),
            #[cfg(test)]
            fail_after_writes: AtomicI64::new(-1),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets `allowed` writes through, then fails the next one, so rollback
    /// paths can be exercised mid-transaction.
    #[cfg(test)]
    pub(crate) fn fail_after_writes(&self, allowed: i64) {
        self.fail_after_writes.store(allowed, Ordering::SeqCst);
    }
}

impl RecordStore for MemoryStore {
    type Txn<'a> = MemoryTxn<'a>;

    fn begin(&self) -> StoreResult<Self::Txn<'_>> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store mutex poisoned".into()))?;
        let snapshot = guard.clone();
        Ok(MemoryTxn {
            snapshot,
            guard,
            committed: false,
            #[cfg(test)]
            fail_after_writes: &self.fail_after_writes,
        })
    }
}

/// Transaction over a [`MemoryStore`].
///
/// Holds the store lock; dropping without [`StoreTxn::commit`] restores the
/// snapshot taken at `begin`.
pub struct MemoryTxn<'a> {
    guard: MutexGuard<'a, Tables>,
    snapshot: Tables,
    committed: bool,
    #[cfg(test)]
    fail_after_writes: &'a AtomicI64,
}

impl MemoryTxn<'_> {
    fn write_allowed(&self) -> StoreResult<()> {
        #[cfg(test)]
        {
            let remaining = self.fail_after_writes.load(Ordering::SeqCst);
            if remaining == 0 {
                self.fail_after_writes.store(-1, Ordering::SeqCst);
                return Err(StoreError::Unavailable(
                    "forced write failure (test hook)".into(),
                ));
            }
            if remaining > 0 {
                self.fail_after_writes.fetch_sub(1, Ordering::SeqCst);
            }
        }
        Ok(())
    }
}

impl Drop for MemoryTxn<'_> {
    fn drop(&mut self) {
        if !self.committed {
            std::mem::swap(&mut *self.guard, &mut self.snapshot);
        }
    }
}

impl StoreTxn for MemoryTxn<'_> {
    fn insert_patient(&mut self, patient: NewPatient) -> StoreResult<i64> {
        self.write_allowed()?;
        Ok(self.guard.patients.insert_with(|id| Patient {
            id,
            name: patient.name,
            national_id: patient.national_id,
            birth_date: patient.birth_date,
        }))
    }

    fn patient(&mut self, id: i64) -> StoreResult<Option<Patient>> {
        Ok(self.guard.patients.get(id))
    }

    fn patients(&mut self) -> StoreResult<Vec<Patient>> {
        Ok(self.guard.patients.all())
    }

    fn insert_professional(&mut self, professional: NewProfessional) -> StoreResult<i64> {
        self.write_allowed()?;
        Ok(self.guard.professionals.insert_with(|id| Professional {
            id,
            name: professional.name,
            registration: professional.registration,
            specialty: professional.specialty,
        }))
    }

    fn professional(&mut self, id: i64) -> StoreResult<Option<Professional>> {
        Ok(self.guard.professionals.get(id))
    }

    fn professionals(&mut self) -> StoreResult<Vec<Professional>> {
        Ok(self.guard.professionals.all())
    }

    fn insert_bed(&mut self, bed: NewBed) -> StoreResult<i64> {
        self.write_allowed()?;
        Ok(self.guard.beds.insert_with(|id| Bed {
            id,
            number: bed.number,
            kind: bed.kind,
            unit: bed.unit,
            status: bed.status,
            admission_id: bed.admission_id,
        }))
    }

    fn bed(&mut self, id: i64) -> StoreResult<Option<Bed>> {
        Ok(self.guard.beds.get(id))
    }

    fn beds(&mut self) -> StoreResult<Vec<Bed>> {
        Ok(self.guard.beds.all())
    }

    fn beds_by_status(&mut self, status: BedStatus) -> StoreResult<Vec<Bed>> {
        let mut beds = self.guard.beds.all();
        beds.retain(|bed| bed.status == status);
        Ok(beds)
    }

    fn beds_by_admission(&mut self, admission_id: i64) -> StoreResult<Vec<Bed>> {
        let mut beds = self.guard.beds.all();
        beds.retain(|bed| bed.admission_id == Some(admission_id));
        Ok(beds)
    }

    fn update_bed(&mut self, bed: &Bed) -> StoreResult<()> {
        self.write_allowed()?;
        if self.guard.beds.replace(bed.id, bed.clone()) {
            Ok(())
        } else {
            Err(StoreError::MissingRow {
                kind: EntityKind::Bed,
                id: bed.id,
            })
        }
    }

    fn insert_admission(&mut self, admission: NewAdmission) -> StoreResult<i64> {
        self.write_allowed()?;
        Ok(self.guard.admissions.insert_with(|id| Admission {
            id,
            patient_id: admission.patient_id,
            admitted_at: admission.admitted_at,
            discharged_at: None,
            reason: admission.reason,
            diagnosis: admission.diagnosis,
            status: admission.status,
        }))
    }

    fn admission(&mut self, id: i64) -> StoreResult<Option<Admission>> {
        Ok(self.guard.admissions.get(id))
    }

    fn admissions(&mut self, status: Option<AdmissionStatus>) -> StoreResult<Vec<Admission>> {
        let mut admissions = self.guard.admissions.all();
        if let Some(status) = status {
            admissions.retain(|admission| admission.status == status);
        }
        Ok(admissions)
    }

    fn update_admission(&mut self, admission: &Admission) -> StoreResult<()> {
        self.write_allowed()?;
        if self.guard.admissions.replace(admission.id, admission.clone()) {
            Ok(())
        } else {
            Err(StoreError::MissingRow {
                kind: EntityKind::Admission,
                id: admission.id,
            })
        }
    }

    fn insert_record(&mut self, record: NewClinicalRecord) -> StoreResult<i64> {
        self.write_allowed()?;
        Ok(self.guard.records.insert_with(|id| ClinicalRecord {
            id,
            patient_id: record.patient_id,
            professional_id: record.professional_id,
            content: record.content,
            version: record.version,
            signed: record.signed,
            signature_hash: record.signature_hash,
            signed_at: record.signed_at,
        }))
    }

    fn record(&mut self, id: i64) -> StoreResult<Option<ClinicalRecord>> {
        Ok(self.guard.records.get(id))
    }

    fn records(&mut self) -> StoreResult<Vec<ClinicalRecord>> {
        Ok(self.guard.records.all())
    }

    fn records_by_patient(&mut self, patient_id: i64) -> StoreResult<Vec<ClinicalRecord>> {
        let mut records = self.guard.records.all();
        records.retain(|record| record.patient_id == patient_id);
        Ok(records)
    }

    fn update_record(&mut self, record: &ClinicalRecord) -> StoreResult<()> {
        self.write_allowed()?;
        if self.guard.records.replace(record.id, record.clone()) {
            Ok(())
        } else {
            Err(StoreError::MissingRow {
                kind: EntityKind::ClinicalRecord,
                id: record.id,
            })
        }
    }

    fn insert_appointment(&mut self, appointment: NewAppointment) -> StoreResult<i64> {
        self.write_allowed()?;
        Ok(self.guard.appointments.insert_with(|id| Appointment {
            id,
            patient_id: appointment.patient_id,
            professional_id: appointment.professional_id,
            scheduled_on: appointment.scheduled_on,
            scheduled_at: appointment.scheduled_at,
            kind: appointment.kind,
            status: appointment.status,
            reason: appointment.reason,
        }))
    }

    fn appointment(&mut self, id: i64) -> StoreResult<Option<Appointment>> {
        Ok(self.guard.appointments.get(id))
    }

    fn appointments_by_patient(&mut self, patient_id: i64) -> StoreResult<Vec<Appointment>> {
        let mut appointments = self.guard.appointments.all();
        appointments.retain(|appointment| appointment.patient_id == patient_id);
        Ok(appointments)
    }

    fn update_appointment(&mut self, appointment: &Appointment) -> StoreResult<()> {
        self.write_allowed()?;
        if self
            .guard
            .appointments
            .replace(appointment.id, appointment.clone())
        {
            Ok(())
        } else {
            Err(StoreError::MissingRow {
                kind: EntityKind::Appointment,
                id: appointment.id,
            })
        }
    }

    fn commit(mut self) -> StoreResult<()> {
        self.committed = true;
        Ok(())
    }
}
