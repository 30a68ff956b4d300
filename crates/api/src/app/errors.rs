use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use myrestful_core::{DomainError, RepositoryError};

use crate::app::negotiation::Format;
use crate::app::validation::ValidationProblem;
use crate::middleware::Fault;

/// Everything a handler or extractor can fail with.
///
/// Only [`ApiError::Fault`] is a fault: it is turned into the final 500
/// response (and logged) by [`crate::middleware::exception_handler`]. The
/// other variants are ordinary request rejections.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("no acceptable representation")]
    NotAcceptable,

    #[error("unsupported media type")]
    UnsupportedMediaType,

    #[error("validation failed")]
    Validation {
        problem: ValidationProblem,
        format: Format,
    },

    #[error(transparent)]
    Fault(#[from] anyhow::Error),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidId(msg) => ApiError::InvalidId(msg),
            DomainError::NotFound => ApiError::NotFound,
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::Fault(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            // Bodiless; status-code pages render these.
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::NotAcceptable => StatusCode::NOT_ACCEPTABLE.into_response(),
            ApiError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response(),
            ApiError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
            ApiError::InvalidBody(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_body", msg),
            ApiError::Validation { problem, format } => {
                match format.respond(StatusCode::UNPROCESSABLE_ENTITY, "ValidationProblem", &problem) {
                    Ok(response) => response,
                    Err(_) => (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(problem)).into_response(),
                }
            }
            ApiError::Fault(err) => Fault::new(err.to_string()).into_response(),
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_rejections() {
        assert!(matches!(
            ApiError::from(DomainError::invalid_id("CityId: bad")),
            ApiError::InvalidId(_)
        ));
        assert!(matches!(ApiError::from(DomainError::not_found()), ApiError::NotFound));
    }

    #[test]
    fn repository_errors_are_faults_carrying_their_message() {
        let err = ApiError::from(RepositoryError::NotFound { entity: "city", id: 4 });
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let fault = response.extensions().get::<Fault>().unwrap();
        assert_eq!(fault.message(), Some("city 4 does not exist"));
    }

    #[test]
    fn invalid_id_uses_json_error_shape() {
        let response = ApiError::InvalidId("CountryId: x".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );
    }
}
