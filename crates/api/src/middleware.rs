use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Extension, Request};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use futures::FutureExt;
use http_body::Body as HttpBody;
use tracing::Instrument;
use uuid::Uuid;

use crate::app::services::AppServices;

/// Log target of the global fault handler.
pub const EXCEPTION_LOG_TARGET: &str = "myrestful_api::global_exception_logger";

/// Event id attached to every fault entry.
pub const EXCEPTION_EVENT_ID: u16 = 500;

/// Body written when a fault carries no usable message.
pub const FALLBACK_FAULT_MESSAGE: &str = "An Error Occurred.";

/// An unhandled failure raised downstream of [`exception_handler`].
///
/// Handlers produce it through `ApiError::Fault`; the handler boundary turns
/// it into the final response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    message: Option<String>,
}

impl Fault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    pub fn without_message() -> Self {
        Self { message: None }
    }

    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        if let Some(msg) = payload.downcast_ref::<&'static str>() {
            Self::new(*msg)
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            Self::new(msg.clone())
        } else {
            Self::without_message()
        }
    }

    /// The fault's message, if it has a non-blank one.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

impl IntoResponse for Fault {
    /// A provisional 500 marked with the fault; [`exception_handler`]
    /// replaces it.
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Catch-all fault boundary around request dispatch.
///
/// Any `Fault`-marked response or panic from downstream becomes a 500 whose
/// body is the fault message (or [`FALLBACK_FAULT_MESSAGE`]), logged exactly
/// once at error level.
pub async fn exception_handler(req: Request, next: Next) -> Response {
    let fault = match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(mut response) => match response.extensions_mut().remove::<Fault>() {
            Some(fault) => fault,
            None => return response,
        },
        Err(payload) => Fault::from_panic(payload),
    };

    let message = fault.message().unwrap_or(FALLBACK_FAULT_MESSAGE).to_string();
    tracing::error!(
        target: EXCEPTION_LOG_TARGET,
        event_id = EXCEPTION_EVENT_ID,
        "{message}"
    );

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        message,
    )
        .into_response()
}

/// Render a plain-text page for failure responses that have no body.
pub async fn status_code_pages(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }
    if HttpBody::size_hint(response.body()).exact() != Some(0) {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(CONTENT_LENGTH);
    parts
        .headers
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    let page = format!(
        "Status Code: {}; {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );
    Response::from_parts(parts, Body::from(page))
}

/// Open a span carrying the request's ambient fields; every event logged
/// while handling the request is recorded inside it.
pub async fn request_context(req: Request, next: Next) -> Response {
    let request_id = Uuid::now_v7();
    let span = tracing::info_span!(
        "request",
        %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let mut response = next.run(req).await;
        tracing::info!(status = response.status().as_u16(), "request completed");
        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert("x-request-id", value);
        }
        response
    }
    .instrument(span)
    .await
}

/// Build the request's scoped services and expose them to handlers as
/// `Extension<Arc<RequestScope>>`.
pub async fn request_scope(
    Extension(services): Extension<Arc<AppServices>>,
    mut req: Request,
    next: Next,
) -> Response {
    req.extensions_mut().insert(Arc::new(services.begin_scope()));
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::Router;
    use axum::routing::get;
    use tower::ServiceExt;
    use tracing_test::traced_test;

    use super::*;
    use crate::app::errors::ApiError;
    use crate::app::services::RequestScope;

    fn app(router: Router) -> Router {
        crate::app::with_pipeline(router, Arc::new(AppServices::new("middleware-tests")))
    }

    async fn get_path(app: Router, path: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri(path)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn error_lines(lines: &[&str], needle: &str) -> usize {
        lines
            .iter()
            .filter(|line| line.contains("ERROR") && line.contains(needle))
            .count()
    }

    async fn failing() -> Result<&'static str, ApiError> {
        Err(anyhow::anyhow!("kaboom").into())
    }

    async fn failing_silently() -> Result<&'static str, ApiError> {
        Err(anyhow::anyhow!("").into())
    }

    async fn panicking() -> &'static str {
        panic!("handler panicked")
    }

    async fn panicking_with_payload() -> &'static str {
        std::panic::panic_any(42_u32)
    }

    async fn missing() -> StatusCode {
        StatusCode::NOT_FOUND
    }

    async fn teapot_with_body() -> (StatusCode, &'static str) {
        (StatusCode::IM_A_TEAPOT, "short and stout")
    }

    #[tokio::test]
    #[traced_test]
    async fn handler_error_becomes_500_with_message_and_one_log_entry() {
        let (status, body) = get_path(app(Router::new().route("/fault", get(failing))), "/fault").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "kaboom");
        logs_assert(|lines: &[&str]| match error_lines(lines, "kaboom") {
            1 => Ok(()),
            n => Err(format!("expected one error entry, found {n}")),
        });
    }

    #[tokio::test]
    #[traced_test]
    async fn empty_message_falls_back_to_generic_text() {
        let (status, body) =
            get_path(app(Router::new().route("/quiet", get(failing_silently))), "/quiet").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, FALLBACK_FAULT_MESSAGE);
        assert!(logs_contain(FALLBACK_FAULT_MESSAGE));
    }

    #[tokio::test]
    #[traced_test]
    async fn panic_is_caught_and_reported() {
        let (status, body) = get_path(app(Router::new().route("/panic", get(panicking))), "/panic").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "handler panicked");
        logs_assert(|lines: &[&str]| match error_lines(lines, "handler panicked") {
            1 => Ok(()),
            n => Err(format!("expected one error entry, found {n}")),
        });
    }

    #[tokio::test]
    async fn non_string_panic_payload_uses_fallback() {
        let (status, body) =
            get_path(app(Router::new().route("/opaque", get(panicking_with_payload))), "/opaque").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, FALLBACK_FAULT_MESSAGE);
    }

    #[tokio::test]
    #[traced_test]
    async fn bodiless_failure_gets_status_page_without_error_log() {
        let (status, body) = get_path(app(Router::new().route("/gone", get(missing))), "/gone").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Status Code: 404; Not Found");
        logs_assert(|lines: &[&str]| match lines.iter().filter(|l| l.contains("ERROR")).count() {
            0 => Ok(()),
            n => Err(format!("expected no error entries, found {n}")),
        });
    }

    #[tokio::test]
    async fn failure_with_body_is_left_alone() {
        let (status, body) =
            get_path(app(Router::new().route("/teapot", get(teapot_with_body))), "/teapot").await;

        assert_eq!(status, StatusCode::IM_A_TEAPOT);
        assert_eq!(body, "short and stout");
    }

    #[tokio::test]
    async fn unknown_route_gets_status_page() {
        let router = Router::new()
            .route("/known", get(|| async { "ok" }))
            .fallback(missing);
        let (status, body) = get_path(app(router), "/unknown").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Status Code: 404; Not Found");
    }

    type Seen = Arc<Mutex<Vec<Arc<RequestScope>>>>;

    async fn record_scope(
        Extension(seen): Extension<Seen>,
        Extension(first): Extension<Arc<RequestScope>>,
        Extension(second): Extension<Arc<RequestScope>>,
    ) -> &'static str {
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(first.countries(), second.countries()));
        assert!(Arc::ptr_eq(first.cities(), second.cities()));
        assert!(Arc::ptr_eq(first.unit_of_work(), second.unit_of_work()));
        seen.lock().unwrap().push(first);
        "ok"
    }

    #[tokio::test]
    async fn scoped_services_are_shared_within_a_request_only() {
        let seen: Seen = Arc::default();
        let app = app(
            Router::new()
                .route("/scope", get(record_scope))
                .layer(Extension(seen.clone())),
        );

        let (status, _) = get_path(app.clone(), "/scope").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = get_path(app, "/scope").await;
        assert_eq!(status, StatusCode::OK);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(!Arc::ptr_eq(&seen[0], &seen[1]));
        assert!(!Arc::ptr_eq(seen[0].countries(), seen[1].countries()));
        assert!(!Arc::ptr_eq(seen[0].unit_of_work(), seen[1].unit_of_work()));
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let response = app(Router::new().route("/id", get(|| async { "ok" })))
            .oneshot(
                axum::http::Request::builder()
                    .uri("/id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let id = response.headers()["x-request-id"].to_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }
}
