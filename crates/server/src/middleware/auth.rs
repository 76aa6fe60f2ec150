//! Session token authentication and role checks

use std::sync::Arc;

use axum::{
    body::Body,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use clinic_core::Role;
use uuid::Uuid;

use crate::error::AppError;
use crate::session::{Session, SessionStore};

/// Header carrying the token returned by `POST /login`
pub const SESSION_HEADER: &str = "X-Session-Token";

/// Session of the authenticated caller, inserted into request extensions
#[derive(Clone)]
pub struct CurrentSession(pub Arc<Session>);

/// User id recorded on the response for the audit log
#[derive(Clone)]
pub struct AuditUser(pub String);

/// Resolve the session token or reject with 401
pub async fn session_middleware(mut request: Request<Body>, next: Next) -> Response {
    let Some(sessions) = request.extensions().get::<SessionStore>().cloned() else {
        return AppError::Internal("Session store not configured".to_string()).into_response();
    };

    let token = request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::try_parse(v.trim()).ok());

    let Some(token) = token else {
        return AppError::Unauthorized(format!("Missing or malformed {} header", SESSION_HEADER))
            .into_response();
    };

    let Some(session) = sessions.get(&token).await else {
        return AppError::Unauthorized("Session expired or unknown. Please log in again.".to_string())
            .into_response();
    };

    let user_id = session.identity.user_id.clone();
    request.extensions_mut().insert(CurrentSession(session));

    let mut response = next.run(request).await;
    response.extensions_mut().insert(AuditUser(user_id));
    response
}

fn require_role(request: &Request<Body>, role: Role) -> Result<(), AppError> {
    match request.extensions().get::<CurrentSession>() {
        Some(CurrentSession(session)) if session.identity.role == role => Ok(()),
        Some(_) => Err(AppError::Forbidden(match role {
            Role::Patient => "Please log in as a patient to access this page.".to_string(),
            Role::Doctor => "Please log in as a doctor to access this page.".to_string(),
        })),
        None => Err(AppError::Unauthorized("Not logged in".to_string())),
    }
}

/// Only patients may chat with the booking assistant
pub async fn require_patient(request: Request<Body>, next: Next) -> Response {
    match require_role(&request, Role::Patient) {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

/// Only doctors may use the dashboard
pub async fn require_doctor(request: Request<Body>, next: Next) -> Response {
    match require_role(&request, Role::Doctor) {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}
