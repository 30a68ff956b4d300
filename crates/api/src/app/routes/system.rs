use axum::http::StatusCode;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Fallback for unmatched paths; the status-code page supplies the body.
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
