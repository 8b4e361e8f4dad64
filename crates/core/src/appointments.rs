//! Outpatient appointment scheduling.
//!
//! Appointments link a patient to a professional at a date and time, either
//! in person or over telemedicine. They enter as `scheduled`; `completed`
//! and `cancelled` are terminal. Cancellation of an already-cancelled
//! appointment is rejected, while a general update deliberately carries no
//! transition guard, matching the system this replaces.

use crate::audit::AuditSink;
use crate::domain::{Appointment, AppointmentKind, AppointmentStatus, EntityKind};
use crate::error::{WorkflowError, WorkflowResult};
use crate::store::{NewAppointment, RecordStore, StoreError, StoreTxn};
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;

/// Input for scheduling an appointment.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    pub patient_id: i64,
    pub professional_id: i64,
    pub scheduled_on: NaiveDate,
    pub scheduled_at: NaiveTime,
    pub kind: AppointmentKind,
    pub reason: Option<String>,
}

/// Partial update of an appointment; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct AppointmentUpdate {
    pub status: Option<AppointmentStatus>,
    pub reason: Option<String>,
}

/// Orchestrates the appointment lifecycle.
#[derive(Debug)]
pub struct AppointmentService<S> {
    store: Arc<S>,
    audit: AuditSink,
}

// Manual impl: a derive would demand `S: Clone`, but only the handle is
// cloned, never the store.
impl<S> Clone for AppointmentService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            audit: self.audit.clone(),
        }
    }
}

impl<S: RecordStore> AppointmentService<S> {
    pub fn new(store: Arc<S>, audit: AuditSink) -> Self {
        Self { store, audit }
    }

    /// Schedules an appointment with status `scheduled`.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::NotFound`] if the patient or professional does not
    /// exist.
    pub fn schedule(&self, actor: &str, request: ScheduleRequest) -> WorkflowResult<Appointment> {
        let mut txn = self.store.begin()?;

        if txn.patient(request.patient_id)?.is_none() {
            return Err(WorkflowError::not_found(
                EntityKind::Patient,
                request.patient_id,
            ));
        }
        if txn.professional(request.professional_id)?.is_none() {
            return Err(WorkflowError::not_found(
                EntityKind::Professional,
                request.professional_id,
            ));
        }

        let appointment_id = txn.insert_appointment(NewAppointment {
            patient_id: request.patient_id,
            professional_id: request.professional_id,
            scheduled_on: request.scheduled_on,
            scheduled_at: request.scheduled_at,
            kind: request.kind,
            status: AppointmentStatus::Scheduled,
            reason: request.reason,
        })?;
        let appointment = txn.appointment(appointment_id)?.ok_or(StoreError::MissingRow {
            kind: EntityKind::Appointment,
            id: appointment_id,
        })?;
        txn.commit()?;

        tracing::info!(
            appointment_id,
            patient_id = appointment.patient_id,
            professional_id = appointment.professional_id,
            "appointment scheduled"
        );
        self.audit.emit(
            actor,
            "appointment.schedule",
            EntityKind::Appointment,
            appointment_id,
        );

        Ok(appointment)
    }

    /// Returns one appointment.
    pub fn get(&self, appointment_id: i64) -> WorkflowResult<Appointment> {
        let mut txn = self.store.begin()?;
        txn.appointment(appointment_id)?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::Appointment, appointment_id))
    }

    /// Appointments for a patient, optionally filtered to one status, in
    /// ascending id order.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::NotFound`] if the patient does not exist.
    pub fn list_for_patient(
        &self,
        patient_id: i64,
        status: Option<AppointmentStatus>,
    ) -> WorkflowResult<Vec<Appointment>> {
        let mut txn = self.store.begin()?;

        if txn.patient(patient_id)?.is_none() {
            return Err(WorkflowError::not_found(EntityKind::Patient, patient_id));
        }

        let mut appointments = txn.appointments_by_patient(patient_id)?;
        if let Some(status) = status {
            appointments.retain(|appointment| appointment.status == status);
        }
        Ok(appointments)
    }

    /// Applies a partial update. No transition guard: a caller may move the
    /// status freely, including re-opening a cancelled appointment.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::NotFound`] if the appointment does not exist.
    pub fn update(
        &self,
        actor: &str,
        appointment_id: i64,
        update: AppointmentUpdate,
    ) -> WorkflowResult<Appointment> {
        let mut txn = self.store.begin()?;

        let mut appointment = txn
            .appointment(appointment_id)?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::Appointment, appointment_id))?;
        if let Some(status) = update.status {
            appointment.status = status;
        }
        if let Some(reason) = update.reason {
            appointment.reason = Some(reason);
        }
        txn.update_appointment(&appointment)?;
        txn.commit()?;

        tracing::info!(appointment_id, status = ?appointment.status, "appointment updated");
        self.audit.emit(
            actor,
            "appointment.update",
            EntityKind::Appointment,
            appointment_id,
        );

        Ok(appointment)
    }

    /// Cancels an appointment, recording the cancellation reason.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::NotFound`] if the appointment does not exist
    /// - [`WorkflowError::Conflict`] if it is already cancelled
    pub fn cancel(
        &self,
        actor: &str,
        appointment_id: i64,
        reason: Option<String>,
    ) -> WorkflowResult<Appointment> {
        let mut txn = self.store.begin()?;

        let mut appointment = txn
            .appointment(appointment_id)?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::Appointment, appointment_id))?;
        if appointment.status == AppointmentStatus::Cancelled {
            return Err(WorkflowError::Conflict(format!(
                "appointment {appointment_id} already cancelled"
            )));
        }

        appointment.status = AppointmentStatus::Cancelled;
        appointment.reason = Some(reason.unwrap_or_else(|| "cancelled by the caller".to_string()));
        txn.update_appointment(&appointment)?;
        txn.commit()?;

        tracing::info!(appointment_id, "appointment cancelled");
        self.audit.emit(
            actor,
            "appointment.cancel",
            EntityKind::Appointment,
            appointment_id,
        );

        Ok(appointment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{memory::MemoryStore, NewPatient, NewProfessional};

    struct Fixture {
        svc: AppointmentService<MemoryStore>,
        patient_id: i64,
        professional_id: i64,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let mut txn = store.begin().expect("begin should succeed");
        let patient_id = txn
            .insert_patient(NewPatient {
                name: "Ana Souza".to_string(),
                national_id: "111.222.333-44".to_string(),
                birth_date: None,
            })
            .expect("insert patient should succeed");
        let professional_id = txn
            .insert_professional(NewProfessional {
                name: "Dr. Lima".to_string(),
                registration: "CRM-12345".to_string(),
                specialty: Some("cardiology".to_string()),
            })
            .expect("insert professional should succeed");
        txn.commit().expect("commit should succeed");

        Fixture {
            svc: AppointmentService::new(store, AuditSink::disabled()),
            patient_id,
            professional_id,
        }
    }

    fn schedule_request(f: &Fixture) -> ScheduleRequest {
        ScheduleRequest {
            patient_id: f.patient_id,
            professional_id: f.professional_id,
            scheduled_on: NaiveDate::from_ymd_opt(2025, 4, 10).expect("valid date"),
            scheduled_at: NaiveTime::from_hms_opt(14, 30, 0).expect("valid time"),
            kind: AppointmentKind::InPerson,
            reason: Some("routine check-up".to_string()),
        }
    }

    #[test]
    fn schedule_creates_a_scheduled_appointment() {
        let f = fixture();
        let appointment = f
            .svc
            .schedule("reception", schedule_request(&f))
            .expect("schedule should succeed");

        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
        assert_eq!(appointment.kind, AppointmentKind::InPerson);
        assert_eq!(appointment.reason.as_deref(), Some("routine check-up"));
    }

    #[test]
    fn schedule_requires_existing_patient_and_professional() {
        let f = fixture();

        let mut request = schedule_request(&f);
        request.patient_id = 999;
        let err = f
            .svc
            .schedule("reception", request)
            .expect_err("schedule should fail");
        assert!(matches!(
            err,
            WorkflowError::NotFound {
                kind: EntityKind::Patient,
                id: 999
            }
        ));

        let mut request = schedule_request(&f);
        request.professional_id = 999;
        let err = f
            .svc
            .schedule("reception", request)
            .expect_err("schedule should fail");
        assert!(matches!(
            err,
            WorkflowError::NotFound {
                kind: EntityKind::Professional,
                id: 999
            }
        ));
    }

    #[test]
    fn update_moves_status_and_keeps_unset_fields() {
        let f = fixture();
        let appointment = f
            .svc
            .schedule("reception", schedule_request(&f))
            .expect("schedule should succeed");

        let updated = f
            .svc
            .update(
                "dr-lima",
                appointment.id,
                AppointmentUpdate {
                    status: Some(AppointmentStatus::Completed),
                    reason: None,
                },
            )
            .expect("update should succeed");

        assert_eq!(updated.status, AppointmentStatus::Completed);
        assert_eq!(
            updated.reason.as_deref(),
            Some("routine check-up"),
            "unset fields must survive a partial update"
        );
    }

    #[test]
    fn cancel_records_the_reason() {
        let f = fixture();
        let appointment = f
            .svc
            .schedule("reception", schedule_request(&f))
            .expect("schedule should succeed");

        let cancelled = f
            .svc
            .cancel(
                "reception",
                appointment.id,
                Some("patient request".to_string()),
            )
            .expect("cancel should succeed");
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
        assert_eq!(cancelled.reason.as_deref(), Some("patient request"));
    }

    #[test]
    fn cancel_without_a_reason_uses_the_default() {
        let f = fixture();
        let appointment = f
            .svc
            .schedule("reception", schedule_request(&f))
            .expect("schedule should succeed");

        let cancelled = f
            .svc
            .cancel("reception", appointment.id, None)
            .expect("cancel should succeed");
        assert_eq!(cancelled.reason.as_deref(), Some("cancelled by the caller"));
    }

    #[test]
    fn cancelling_twice_is_rejected() {
        let f = fixture();
        let appointment = f
            .svc
            .schedule("reception", schedule_request(&f))
            .expect("schedule should succeed");
        f.svc
            .cancel("reception", appointment.id, None)
            .expect("first cancel should succeed");

        let err = f
            .svc
            .cancel("reception", appointment.id, None)
            .expect_err("second cancel should fail");
        assert!(matches!(err, WorkflowError::Conflict(_)));
    }

    #[test]
    fn unknown_appointment_is_not_found() {
        let f = fixture();

        assert!(matches!(
            f.svc.get(77).expect_err("get should fail"),
            WorkflowError::NotFound {
                kind: EntityKind::Appointment,
                id: 77
            }
        ));
        assert!(matches!(
            f.svc
                .update("dr-lima", 77, AppointmentUpdate::default())
                .expect_err("update should fail"),
            WorkflowError::NotFound { .. }
        ));
        assert!(matches!(
            f.svc
                .cancel("dr-lima", 77, None)
                .expect_err("cancel should fail"),
            WorkflowError::NotFound { .. }
        ));
    }

    #[test]
    fn patient_listing_filters_by_status() {
        let f = fixture();
        let first = f
            .svc
            .schedule("reception", schedule_request(&f))
            .expect("schedule should succeed");
        let second = f
            .svc
            .schedule("reception", schedule_request(&f))
            .expect("schedule should succeed");
        f.svc
            .cancel("reception", first.id, None)
            .expect("cancel should succeed");

        let all = f
            .svc
            .list_for_patient(f.patient_id, None)
            .expect("list should succeed");
        assert_eq!(all.len(), 2);
        assert!(all[0].id < all[1].id, "listing should be stably ordered");

        let scheduled = f
            .svc
            .list_for_patient(f.patient_id, Some(AppointmentStatus::Scheduled))
            .expect("list should succeed");
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].id, second.id);

        let err = f
            .svc
            .list_for_patient(999, None)
            .expect_err("unknown patient should fail");
        assert!(matches!(
            err,
            WorkflowError::NotFound {
                kind: EntityKind::Patient,
                id: 999
            }
        ));
    }

    #[test]
    fn mutations_emit_audit_events() {
        let f = fixture();
        let (sink, rx) = AuditSink::channel();
        let svc = AppointmentService {
            audit: sink,
            ..f.svc.clone()
        };

        let appointment = svc
            .schedule("reception", schedule_request(&f))
            .expect("schedule should succeed");
        svc.update(
            "dr-lima",
            appointment.id,
            AppointmentUpdate {
                status: Some(AppointmentStatus::Completed),
                reason: None,
            },
        )
        .expect("update should succeed");

        let actions: Vec<String> = rx.try_iter().map(|event| event.action).collect();
        assert_eq!(actions, vec!["appointment.schedule", "appointment.update"]);
    }
}
