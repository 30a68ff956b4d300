//! HTTP API application wiring (Axum router + request pipeline).
//!
//! - `services.rs`: shared store, persistence wiring, per-request scope
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs` / `mapping.rs`: wire resources and their entity conversions
//! - `negotiation.rs`: Accept / Content-Type handling for JSON and XML
//! - `validation.rs`: request-body validators and the `Validated` extractor
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{middleware::from_fn, Extension, Router};
use tower::ServiceBuilder;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod mapping;
pub mod negotiation;
pub mod routes;
pub mod services;
pub mod validation;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &ApiConfig) -> Router {
    build_app_with(Arc::new(services::AppServices::new(&config.database_name)))
}

/// Build the router over already-wired services.
pub fn build_app_with(services: Arc<services::AppServices>) -> Router {
    with_pipeline(routes::router(), services)
}

/// Wrap `router` in the request pipeline.
///
/// Outermost first: status-code pages, request span, fault boundary,
/// shared services, per-request scope.
pub fn with_pipeline(router: Router, services: Arc<services::AppServices>) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(from_fn(middleware::status_code_pages))
            .layer(from_fn(middleware::request_context))
            .layer(from_fn(middleware::exception_handler))
            .layer(Extension(services))
            .layer(from_fn(middleware::request_scope)),
    )
}
