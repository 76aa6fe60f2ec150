//! Audit logging middleware for mutations

use axum::{body::Body, extract::Request, http::Method, middleware::Next, response::Response};

use super::auth::AuditUser;
use super::request_id::RequestId;

/// Log every POST, PUT and DELETE with the acting user, for audit purposes
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let response = next.run(request).await;

    if matches!(method, Method::POST | Method::PUT | Method::DELETE) {
        let user = response
            .extensions()
            .get::<AuditUser>()
            .map(|u| u.0.as_str())
            .unwrap_or("anonymous");

        tracing::info!(
            target: "audit",
            request_id = %request_id,
            user = %user,
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            "Mutation request"
        );
    }

    response
}
