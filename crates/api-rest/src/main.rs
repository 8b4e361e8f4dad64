//! VidaPlus REST API server binary.
//!
//! Serves the hospital workflows over HTTP with OpenAPI/Swagger
//! documentation. State is held in the in-memory store; every request is
//! attributed to the actor named by the `x-actor-id` header and mutations
//! are forwarded to the audit log.

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post, put},
    Router,
};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_rest::dto;
use vidaplus_core::{
    AdmissionService, AdmissionStatus, AdmitRequest, AppointmentService, AppointmentStatus,
    AppointmentUpdate, AuditSink, MemoryStore, NewBedRequest, NewPatientRequest,
    NewProfessionalRequest, NewRecord, RecordService, RegistryService, ScheduleRequest,
    Sha256Signer, WorkflowError,
};

/// Shared state for the request handlers: the workflow services over one
/// in-memory store.
#[derive(Clone)]
struct AppState {
    registry: RegistryService<MemoryStore>,
    admissions: AdmissionService<MemoryStore>,
    appointments: AppointmentService<MemoryStore>,
    records: RecordService<MemoryStore, Sha256Signer>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_patients,
        create_patient,
        patient_records,
        list_professionals,
        create_professional,
        list_beds,
        create_bed,
        available_beds,
        list_admissions,
        admit_patient,
        admission_details,
        discharge_patient,
        schedule_appointment,
        get_appointment,
        update_appointment,
        cancel_appointment,
        patient_appointments,
        list_records,
        create_record,
        get_record,
        update_record,
        sign_record,
        export_record,
    ),
    components(schemas(
        dto::HealthRes,
        dto::BedKind,
        dto::BedStatus,
        dto::AdmissionStatus,
        dto::CreatePatientReq,
        dto::PatientRes,
        dto::ListPatientsRes,
        dto::CreateProfessionalReq,
        dto::ProfessionalRes,
        dto::ListProfessionalsRes,
        dto::CreateBedReq,
        dto::BedRes,
        dto::ListBedsRes,
        dto::AdmitReq,
        dto::AdmitRes,
        dto::AdmissionRes,
        dto::ListAdmissionsRes,
        dto::AdmissionDetailsRes,
        dto::AppointmentKind,
        dto::AppointmentStatus,
        dto::ScheduleAppointmentReq,
        dto::UpdateAppointmentReq,
        dto::CancelAppointmentReq,
        dto::AppointmentRes,
        dto::ListAppointmentsRes,
        dto::CreateRecordReq,
        dto::UpdateRecordReq,
        dto::SignRecordReq,
        dto::RecordRes,
        dto::ListRecordsRes,
        dto::RecordDetailsRes,
        dto::RecordExportRes,
    ))
)]
struct ApiDoc;

/// Main entry point for the VidaPlus REST API server.
///
/// # Environment Variables
/// - `VIDAPLUS_REST_ADDR`: Server address (default: "0.0.0.0:3000")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("vidaplus_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("VIDAPLUS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting VidaPlus REST API on {}", addr);

    let store = Arc::new(MemoryStore::new());
    let (audit, audit_rx) = AuditSink::channel();

    // Audit consumer: drain the channel onto the structured log.
    std::thread::spawn(move || {
        for event in audit_rx {
            tracing::info!(
                actor = %event.actor_id,
                action = %event.action,
                entity = %event.entity_kind,
                entity_id = event.entity_id,
                at = %event.at,
                "audit"
            );
        }
    });

    let state = AppState {
        registry: RegistryService::new(store.clone(), audit.clone()),
        admissions: AdmissionService::new(store.clone(), audit.clone()),
        appointments: AppointmentService::new(store.clone(), audit.clone()),
        records: RecordService::new(store, Sha256Signer, audit),
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/patients", get(list_patients))
        .route("/patients", post(create_patient))
        .route("/patients/:id/records", get(patient_records))
        .route("/professionals", get(list_professionals))
        .route("/professionals", post(create_professional))
        .route("/beds", get(list_beds))
        .route("/beds", post(create_bed))
        .route("/beds/available", get(available_beds))
        .route("/admissions", get(list_admissions))
        .route("/admissions", post(admit_patient))
        .route("/admissions/:id", get(admission_details))
        .route("/admissions/:id/discharge", post(discharge_patient))
        .route("/appointments", post(schedule_appointment))
        .route("/appointments/:id", get(get_appointment))
        .route("/appointments/:id", put(update_appointment))
        .route("/appointments/:id/cancel", post(cancel_appointment))
        .route("/patients/:id/appointments", get(patient_appointments))
        .route("/records", get(list_records))
        .route("/records", post(create_record))
        .route("/records/:id", get(get_record))
        .route("/records/:id", put(update_record))
        .route("/records/:id/sign", post(sign_record))
        .route("/records/:id/export", get(export_record))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Actor attribution for the audit trail. Falls back to `system` when the
/// caller does not identify itself.
fn actor(headers: &HeaderMap) -> String {
    headers
        .get("x-actor-id")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .unwrap_or("system")
        .to_owned()
}

/// Maps workflow errors onto HTTP status codes. Storage failures are logged
/// here and surface as an opaque 500.
fn map_err(err: WorkflowError) -> (StatusCode, String) {
    match err {
        WorkflowError::Validation(message) => (StatusCode::BAD_REQUEST, message),
        WorkflowError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        WorkflowError::Conflict(message) => (StatusCode::CONFLICT, message),
        WorkflowError::Storage(source) => {
            tracing::error!("storage error: {:?}", source);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = dto::HealthRes)
    )
)]
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<dto::HealthRes> {
    Json(dto::HealthRes {
        ok: true,
        message: "VidaPlus REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "List of patients", body = dto::ListPatientsRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn list_patients(
    State(state): State<AppState>,
) -> Result<Json<dto::ListPatientsRes>, (StatusCode, String)> {
    let patients = state.registry.list_patients().map_err(map_err)?;
    Ok(Json(dto::ListPatientsRes {
        patients: patients.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = dto::CreatePatientReq,
    responses(
        (status = 201, description = "Patient registered", body = dto::PatientRes),
        (status = 400, description = "Bad request"),
        (status = 409, description = "National id already registered"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn create_patient(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<dto::CreatePatientReq>,
) -> Result<(StatusCode, Json<dto::PatientRes>), (StatusCode, String)> {
    let patient = state
        .registry
        .create_patient(
            &actor(&headers),
            NewPatientRequest {
                name: req.name,
                national_id: req.national_id,
                birth_date: req.birth_date,
            },
        )
        .map_err(map_err)?;
    Ok((StatusCode::CREATED, Json(patient.into())))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/records",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Clinical records for the patient", body = dto::ListRecordsRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn patient_records(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> Result<Json<dto::ListRecordsRes>, (StatusCode, String)> {
    let records = state.records.history(id).map_err(map_err)?;
    Ok(Json(dto::ListRecordsRes {
        records: records.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/professionals",
    responses(
        (status = 200, description = "List of professionals", body = dto::ListProfessionalsRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn list_professionals(
    State(state): State<AppState>,
) -> Result<Json<dto::ListProfessionalsRes>, (StatusCode, String)> {
    let professionals = state.registry.list_professionals().map_err(map_err)?;
    Ok(Json(dto::ListProfessionalsRes {
        professionals: professionals.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/professionals",
    request_body = dto::CreateProfessionalReq,
    responses(
        (status = 201, description = "Professional registered", body = dto::ProfessionalRes),
        (status = 400, description = "Bad request"),
        (status = 409, description = "Registration already taken"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn create_professional(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<dto::CreateProfessionalReq>,
) -> Result<(StatusCode, Json<dto::ProfessionalRes>), (StatusCode, String)> {
    let professional = state
        .registry
        .create_professional(
            &actor(&headers),
            NewProfessionalRequest {
                name: req.name,
                registration: req.registration,
                specialty: req.specialty,
            },
        )
        .map_err(map_err)?;
    Ok((StatusCode::CREATED, Json(professional.into())))
}

#[utoipa::path(
    get,
    path = "/beds",
    responses(
        (status = 200, description = "List of beds", body = dto::ListBedsRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn list_beds(
    State(state): State<AppState>,
) -> Result<Json<dto::ListBedsRes>, (StatusCode, String)> {
    let beds = state.registry.list_beds().map_err(map_err)?;
    Ok(Json(dto::ListBedsRes {
        beds: beds.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/beds",
    request_body = dto::CreateBedReq,
    responses(
        (status = 201, description = "Bed registered", body = dto::BedRes),
        (status = 400, description = "Bad request"),
        (status = 409, description = "Bed number already registered"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn create_bed(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<dto::CreateBedReq>,
) -> Result<(StatusCode, Json<dto::BedRes>), (StatusCode, String)> {
    let bed = state
        .registry
        .create_bed(
            &actor(&headers),
            NewBedRequest {
                number: req.number,
                kind: req.kind.into(),
                unit: req.unit,
            },
        )
        .map_err(map_err)?;
    Ok((StatusCode::CREATED, Json(bed.into())))
}

#[utoipa::path(
    get,
    path = "/beds/available",
    responses(
        (status = 200, description = "Beds currently free for admission", body = dto::ListBedsRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn available_beds(
    State(state): State<AppState>,
) -> Result<Json<dto::ListBedsRes>, (StatusCode, String)> {
    let beds = state.admissions.available_beds().map_err(map_err)?;
    Ok(Json(dto::ListBedsRes {
        beds: beds.into_iter().map(Into::into).collect(),
    }))
}

#[derive(Debug, serde::Deserialize, utoipa::IntoParams)]
struct ListAdmissionsQuery {
    /// Restrict the listing to one admission status.
    status: Option<String>,
}

#[utoipa::path(
    get,
    path = "/admissions",
    params(ListAdmissionsQuery),
    responses(
        (status = 200, description = "List of admissions", body = dto::ListAdmissionsRes),
        (status = 400, description = "Unknown status filter"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn list_admissions(
    State(state): State<AppState>,
    Query(query): Query<ListAdmissionsQuery>,
) -> Result<Json<dto::ListAdmissionsRes>, (StatusCode, String)> {
    let status = match query.status {
        Some(raw) => Some(
            AdmissionStatus::from_str(&raw).map_err(|message| (StatusCode::BAD_REQUEST, message))?,
        ),
        None => None,
    };

    let admissions = state.admissions.list(status).map_err(map_err)?;
    Ok(Json(dto::ListAdmissionsRes {
        admissions: admissions.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/admissions",
    request_body = dto::AdmitReq,
    responses(
        (status = 201, description = "Patient admitted", body = dto::AdmitRes),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Patient or bed not found"),
        (status = 409, description = "Bed not available"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn admit_patient(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<dto::AdmitReq>,
) -> Result<(StatusCode, Json<dto::AdmitRes>), (StatusCode, String)> {
    let admission_id = state
        .admissions
        .admit(
            &actor(&headers),
            AdmitRequest {
                patient_id: req.patient_id,
                bed_id: req.bed_id,
                reason: req.reason,
                diagnosis: req.diagnosis,
            },
        )
        .map_err(map_err)?;
    Ok((StatusCode::CREATED, Json(dto::AdmitRes { admission_id })))
}

#[utoipa::path(
    get,
    path = "/admissions/{id}",
    params(("id" = i64, Path, description = "Admission id")),
    responses(
        (status = 200, description = "Admission with patient and bed", body = dto::AdmissionDetailsRes),
        (status = 404, description = "Admission not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn admission_details(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> Result<Json<dto::AdmissionDetailsRes>, (StatusCode, String)> {
    let details = state.admissions.details(id).map_err(map_err)?;
    Ok(Json(details.into()))
}

#[utoipa::path(
    post,
    path = "/admissions/{id}/discharge",
    params(("id" = i64, Path, description = "Admission id")),
    responses(
        (status = 200, description = "Patient discharged", body = dto::AdmissionRes),
        (status = 404, description = "Admission not found"),
        (status = 409, description = "Admission already discharged"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn discharge_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
    headers: HeaderMap,
) -> Result<Json<dto::AdmissionRes>, (StatusCode, String)> {
    let admission = state
        .admissions
        .discharge(&actor(&headers), id)
        .map_err(map_err)?;
    Ok(Json(admission.into()))
}

#[utoipa::path(
    post,
    path = "/appointments",
    request_body = dto::ScheduleAppointmentReq,
    responses(
        (status = 201, description = "Appointment scheduled", body = dto::AppointmentRes),
        (status = 404, description = "Patient or professional not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn schedule_appointment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<dto::ScheduleAppointmentReq>,
) -> Result<(StatusCode, Json<dto::AppointmentRes>), (StatusCode, String)> {
    let appointment = state
        .appointments
        .schedule(
            &actor(&headers),
            ScheduleRequest {
                patient_id: req.patient_id,
                professional_id: req.professional_id,
                scheduled_on: req.scheduled_on,
                scheduled_at: req.scheduled_at,
                kind: req.kind.into(),
                reason: req.reason,
            },
        )
        .map_err(map_err)?;
    Ok((StatusCode::CREATED, Json(appointment.into())))
}

#[utoipa::path(
    get,
    path = "/appointments/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment", body = dto::AppointmentRes),
        (status = 404, description = "Appointment not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn get_appointment(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> Result<Json<dto::AppointmentRes>, (StatusCode, String)> {
    let appointment = state.appointments.get(id).map_err(map_err)?;
    Ok(Json(appointment.into()))
}

#[utoipa::path(
    put,
    path = "/appointments/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    request_body = dto::UpdateAppointmentReq,
    responses(
        (status = 200, description = "Appointment updated", body = dto::AppointmentRes),
        (status = 404, description = "Appointment not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn update_appointment(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
    headers: HeaderMap,
    Json(req): Json<dto::UpdateAppointmentReq>,
) -> Result<Json<dto::AppointmentRes>, (StatusCode, String)> {
    let appointment = state
        .appointments
        .update(
            &actor(&headers),
            id,
            AppointmentUpdate {
                status: req.status.map(Into::into),
                reason: req.reason,
            },
        )
        .map_err(map_err)?;
    Ok(Json(appointment.into()))
}

#[utoipa::path(
    post,
    path = "/appointments/{id}/cancel",
    params(("id" = i64, Path, description = "Appointment id")),
    request_body = dto::CancelAppointmentReq,
    responses(
        (status = 200, description = "Appointment cancelled", body = dto::AppointmentRes),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment already cancelled"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn cancel_appointment(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
    headers: HeaderMap,
    Json(req): Json<dto::CancelAppointmentReq>,
) -> Result<Json<dto::AppointmentRes>, (StatusCode, String)> {
    let appointment = state
        .appointments
        .cancel(&actor(&headers), id, req.reason)
        .map_err(map_err)?;
    Ok(Json(appointment.into()))
}

#[derive(Debug, serde::Deserialize, utoipa::IntoParams)]
struct PatientAppointmentsQuery {
    /// Restrict the listing to one appointment status.
    status: Option<String>,
}

#[utoipa::path(
    get,
    path = "/patients/{id}/appointments",
    params(
        ("id" = i64, Path, description = "Patient id"),
        PatientAppointmentsQuery
    ),
    responses(
        (status = 200, description = "Appointments for the patient", body = dto::ListAppointmentsRes),
        (status = 400, description = "Unknown status filter"),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn patient_appointments(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
    Query(query): Query<PatientAppointmentsQuery>,
) -> Result<Json<dto::ListAppointmentsRes>, (StatusCode, String)> {
    let status = match query.status {
        Some(raw) => Some(
            AppointmentStatus::from_str(&raw)
                .map_err(|message| (StatusCode::BAD_REQUEST, message))?,
        ),
        None => None,
    };

    let appointments = state
        .appointments
        .list_for_patient(id, status)
        .map_err(map_err)?;
    Ok(Json(dto::ListAppointmentsRes {
        appointments: appointments.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/records",
    responses(
        (status = 200, description = "All clinical records", body = dto::ListRecordsRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn list_records(
    State(state): State<AppState>,
) -> Result<Json<dto::ListRecordsRes>, (StatusCode, String)> {
    let records = state.records.list().map_err(map_err)?;
    Ok(Json(dto::ListRecordsRes {
        records: records.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/records",
    request_body = dto::CreateRecordReq,
    responses(
        (status = 201, description = "Clinical record created", body = dto::RecordRes),
        (status = 404, description = "Patient or professional not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn create_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<dto::CreateRecordReq>,
) -> Result<(StatusCode, Json<dto::RecordRes>), (StatusCode, String)> {
    let record = state
        .records
        .create(
            &actor(&headers),
            NewRecord {
                patient_id: req.patient_id,
                professional_id: req.professional_id,
                content: req.content,
            },
        )
        .map_err(map_err)?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

#[utoipa::path(
    get,
    path = "/records/{id}",
    params(("id" = i64, Path, description = "Record id")),
    responses(
        (status = 200, description = "Record with patient and professional", body = dto::RecordDetailsRes),
        (status = 404, description = "Record not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn get_record(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> Result<Json<dto::RecordDetailsRes>, (StatusCode, String)> {
    let details = state.records.get(id).map_err(map_err)?;
    Ok(Json(details.into()))
}

#[utoipa::path(
    put,
    path = "/records/{id}",
    params(("id" = i64, Path, description = "Record id")),
    request_body = dto::UpdateRecordReq,
    responses(
        (status = 200, description = "Record updated; signature retracted", body = dto::RecordRes),
        (status = 404, description = "Record not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn update_record(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
    headers: HeaderMap,
    Json(req): Json<dto::UpdateRecordReq>,
) -> Result<Json<dto::RecordRes>, (StatusCode, String)> {
    let record = state
        .records
        .update(&actor(&headers), id, req.content)
        .map_err(map_err)?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    post,
    path = "/records/{id}/sign",
    params(("id" = i64, Path, description = "Record id")),
    request_body = dto::SignRecordReq,
    responses(
        (status = 200, description = "Record signed", body = dto::RecordRes),
        (status = 404, description = "Record not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn sign_record(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
    headers: HeaderMap,
    Json(req): Json<dto::SignRecordReq>,
) -> Result<Json<dto::RecordRes>, (StatusCode, String)> {
    let record = state
        .records
        .sign(&actor(&headers), id, &req.secret)
        .map_err(map_err)?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    get,
    path = "/records/{id}/export",
    params(("id" = i64, Path, description = "Record id")),
    responses(
        (status = 200, description = "Record with a rendering reference", body = dto::RecordExportRes),
        (status = 404, description = "Record not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn export_record(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> Result<Json<dto::RecordExportRes>, (StatusCode, String)> {
    let export = state.records.export_reference(id).map_err(map_err)?;
    Ok(Json(export.into()))
}
