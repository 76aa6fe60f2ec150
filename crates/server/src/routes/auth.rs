//! Login and logout

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use clinic_core::Role;
use deadpool_postgres::Pool;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ai::{self, ClaudeClient};
use crate::db::{PatientIdType, UserRepository};
use crate::error::AppError;
use crate::middleware::CurrentSession;
use crate::session::SessionStore;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials. Please try again.";

/// Request body for login
#[derive(Deserialize)]
pub struct LoginRequest {
    user_id: String,
    password: String,
    login_type: Role,
    /// Only used for patients
    #[serde(default)]
    patient_id_type: PatientIdType,
}

/// Response body for login
#[derive(Serialize)]
pub struct LoginResponse {
    token: Uuid,
    user: String,
    name: String,
    role: Role,
}

/// POST /login - Check credentials and open a session
///
/// Patients log in with their BruHIMS or IC number, doctors with their
/// staff id. The returned token goes into the `X-Session-Token` header.
pub async fn login(
    State(pool): State<Pool>,
    Extension(sessions): Extension<SessionStore>,
    Extension(client): Extension<Option<ClaudeClient>>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let repo = UserRepository::new(pool);
    let user_id = body.user_id.trim();

    let identity = match body.login_type {
        Role::Patient => {
            repo.authenticate_patient(body.patient_id_type, user_id, &body.password)
                .await?
        }
        Role::Doctor => repo.authenticate_doctor(user_id, &body.password).await?,
    };

    let Some(identity) = identity else {
        tracing::warn!(user_id = %user_id, login_type = ?body.login_type, "Login failed");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    let session = sessions
        .create(identity, ai::responder_for(client.as_ref()))
        .await;

    tracing::info!(
        user = %session.identity.user_id,
        role = ?session.identity.role,
        "Session opened"
    );

    Ok(Json(LoginResponse {
        token: session.token,
        user: session.identity.user_id.clone(),
        name: session.identity.display_name.clone(),
        role: session.identity.role,
    }))
}

/// POST /logout - Close the caller's session
pub async fn logout(
    Extension(sessions): Extension<SessionStore>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> StatusCode {
    sessions.remove(&session.token).await;
    tracing::info!(user = %session.identity.user_id, "Session closed");
    StatusCode::NO_CONTENT
}
