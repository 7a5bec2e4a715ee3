//! Consistent error responses.
//!
//! Handlers never render failures themselves. They return an empty-bodied
//! status (or panic) and the branch-specific pipeline stages decide what the
//! client sees: an error page for web requests, a problem-details body for API
//! requests.

use std::any::Any;

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// Response extension marking a failure nobody handled (a panic or an
/// [`AppError::Internal`]). The error stages key off it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UnhandledFailure;

impl UnhandledFailure {
    pub fn is_marked(response: &Response) -> bool {
        response.extensions().get::<UnhandledFailure>().is_some()
    }

    /// Empty `500` flagged as an unhandled failure.
    pub fn response() -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(UnhandledFailure);
        response
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A deliberate error status; the status stages decorate it.
    #[error("{0}")]
    Status(StatusCode),

    /// Anything unexpected. Logged here; the text never reaches the client.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Status(status) => status.into_response(),
            AppError::Internal(e) => {
                error!(error = ?e, "unhandled error while processing request");
                UnhandledFailure::response()
            }
        }
    }
}

/// Panic handler for the routing layer.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!(panic = message, "request handler panicked");
    UnhandledFailure::response()
}

/// Machine-readable error body returned to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub status: u16,
    pub instance: String,
    pub trace_id: String,
}

pub const PROBLEM_JSON: &str = "application/problem+json";

impl ProblemDetails {
    pub fn new(status: StatusCode, instance: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self {
            kind: format!("https://httpstatuses.io/{}", status.as_u16()),
            title: status.canonical_reason().unwrap_or("Unknown").to_string(),
            status: status.as_u16(),
            instance: instance.into(),
            trace_id: trace_id.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match serde_json::to_vec(&self) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "failed to serialize problem details");
                return status.into_response();
            }
        };
        (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON))],
            body,
        )
            .into_response()
    }
}
