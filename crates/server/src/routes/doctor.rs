//! Doctor dashboard: appointment triage and medication lookup

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use clinic_core::AppointmentStatus;
use deadpool_postgres::Pool;
use serde::Deserialize;

use crate::db::{AppointmentRepository, MedicationRepository};
use crate::error::AppError;
use crate::middleware::CurrentSession;

/// Request body for a status change
#[derive(Deserialize)]
pub struct StatusUpdate {
    /// One of `approve`, `reject`, `pending`, `complete`
    action: String,
}

/// Query parameters for medication search
#[derive(Deserialize)]
pub struct MedicationQuery {
    q: Option<String>,
}

/// GET /doctor/appointments - Appointments of this doctor and the unassigned queue
pub async fn appointments(
    State(pool): State<Pool>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> Result<impl IntoResponse, AppError> {
    let repo = AppointmentRepository::new(pool);
    let appointments = repo.for_doctor(&session.identity.user_id).await?;
    Ok(Json(appointments))
}

/// POST /doctor/appointments/{id}/status - Approve, reject, reopen or complete
pub async fn update_status(
    State(pool): State<Pool>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Path(id): Path<i32>,
    Json(body): Json<StatusUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let status = AppointmentStatus::from_action(body.action.trim())?;

    let repo = AppointmentRepository::new(pool);
    match repo
        .update_status(id, &session.identity.user_id, status)
        .await?
    {
        Some(appointment) => Ok(Json(appointment)),
        None => Err(AppError::NotFound(format!("Appointment {} not found", id))),
    }
}

/// GET /doctor/medications?q= - Medications by patient BruHIMS or IC number
pub async fn medications(
    State(pool): State<Pool>,
    Query(params): Query<MedicationQuery>,
) -> Result<impl IntoResponse, AppError> {
    let query = params.q.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(AppError::BadRequest(
            "Missing search query: pass a BruHIMS or IC number as `q`".to_string(),
        ));
    }

    let repo = MedicationRepository::new(pool);
    let records = repo.search(query).await?;
    tracing::info!(results = records.len(), "Medication search");
    Ok(Json(records))
}
