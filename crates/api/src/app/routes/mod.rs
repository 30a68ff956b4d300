use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use crate::app::errors::ApiError;
use crate::app::negotiation::Format;

pub mod cities;
pub mod countries;
pub mod system;

/// Router for every endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .nest("/api/countries", countries::router())
        .fallback(system::not_found)
}

/// 201 with the new resource and its `Location`.
pub(crate) fn created<T: Serialize>(
    format: Format,
    location: &str,
    root: &str,
    resource: &T,
) -> Result<Response, ApiError> {
    let mut response = format.respond(StatusCode::CREATED, root, resource)?;
    let location = HeaderValue::from_str(location).map_err(anyhow::Error::from)?;
    response.headers_mut().insert(LOCATION, location);
    Ok(response)
}
