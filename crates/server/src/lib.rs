//! clinic-server library crate
//!
//! Exposes `build_app`, `config` and `db` for integration tests.
//! The actual binary entrypoint is in `main.rs`.

mod ai;
pub mod config;
pub mod db;
pub mod error;
mod middleware;
mod routes;
pub mod session;

use std::sync::Arc;

use axum::{
    Extension, Router, middleware as axum_mw,
    routing::{get, post},
};
use clinic_core::BookingDialogue;
use deadpool_postgres::Pool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use db::AppointmentRepository;
use session::SessionStore;

pub use middleware::SESSION_HEADER;

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a TCP port.
pub fn build_app(pool: Pool, config: &Config) -> Router {
    let sessions = SessionStore::new(config.session_idle_timeout);
    let rate_limiter = middleware::create_rate_limiter(config.rate_limit_rps);

    // Booking dialogue, persisting into the same pool the routes use
    let dialogue = Arc::new(BookingDialogue::new(AppointmentRepository::new(
        pool.clone(),
    )));

    // Claude client (None if ANTHROPIC_API_KEY not set)
    let claude_client: Option<ai::ClaudeClient> =
        config.anthropic_api_key.as_ref().map(|key| {
            let client = ai::ClaudeClient::new(key.clone());
            match &config.anthropic_model {
                Some(model) => client.with_model(model.clone()),
                None => client,
            }
        });

    // Routes behind a session token
    let protected_routes = Router::new()
        .merge(routes::patient_routes())
        .nest("/doctor", routes::doctor_routes())
        .route("/logout", post(routes::auth::logout))
        .layer(axum_mw::from_fn(middleware::session_middleware));

    // Login plus everything protected shares the rate limit
    let api_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .merge(protected_routes)
        .layer(axum_mw::from_fn(middleware::rate_limit_middleware))
        .layer(Extension(rate_limiter));

    // Install Prometheus metrics recorder.
    // build_recorder() + set_global_recorder() tolerates repeated calls
    // (integration tests build the app many times in one process).
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    let prometheus_handle = recorder.handle();
    let _ = metrics::set_global_recorder(recorder);

    // Public routes (no session required)
    let public_routes = Router::new()
        .route("/health", get(routes::health::check))
        .route("/metrics", get(routes::metrics::get))
        .layer(Extension(prometheus_handle));

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .with_state(pool)
        .layer(Extension(sessions))
        .layer(Extension(claude_client))
        .layer(Extension(dialogue))
        .layer(axum_mw::from_fn(middleware::audit_middleware))
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}
