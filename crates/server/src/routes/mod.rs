pub mod auth;
pub mod chat;
pub mod doctor;
pub mod health;
pub mod metrics;

use axum::{
    Router, middleware as axum_mw,
    routing::{get, post},
};
use deadpool_postgres::Pool;

use crate::middleware::{require_doctor, require_patient};

/// Booking assistant routes (patients only)
pub fn patient_routes() -> Router<Pool> {
    Router::new()
        .route("/chat", post(chat::chat))
        .route("/chat/state", get(chat::state))
        .route("/cancel_booking", post(chat::cancel_booking))
        .layer(axum_mw::from_fn(require_patient))
}

/// Dashboard routes (doctors only), nested under `/doctor`
pub fn doctor_routes() -> Router<Pool> {
    Router::new()
        .route("/appointments", get(doctor::appointments))
        .route("/appointments/{id}/status", post(doctor::update_status))
        .route("/medications", get(doctor::medications))
        .layer(axum_mw::from_fn(require_doctor))
}
