//! Per-request context values stored in request extensions.
//!
//! All of these are computed once by the first pipeline stage (or by the
//! localization stage for the culture) and are immutable afterwards.

use axum::http::{HeaderMap, header};
use uuid::Uuid;

/// Which failure-handling branch a request takes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RequestClassification {
    /// Browser navigation expecting HTML.
    Web,
    /// Programmatic client expecting JSON.
    Api,
}

/// Path prefixes that always classify as API.
pub const API_PATH_PREFIXES: &[&str] = &["/api", "/swagger", "/status"];

fn has_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

impl RequestClassification {
    /// Classify a request by path, then by content negotiation.
    pub fn classify(path: &str, headers: &HeaderMap) -> Self {
        if API_PATH_PREFIXES.iter().any(|p| has_prefix(path, p)) {
            return RequestClassification::Api;
        }

        let accept = headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let wants_json = accept.contains("application/json") || accept.contains("+json");
        let wants_html = accept.contains("text/html");

        if wants_json && !wants_html {
            RequestClassification::Api
        } else {
            RequestClassification::Web
        }
    }

    pub fn is_web(self) -> bool {
        self == RequestClassification::Web
    }

    pub fn is_api(self) -> bool {
        self == RequestClassification::Api
    }
}

/// Correlation identifier for one request; echoed as `x-request-id` and as
/// `traceId` in problem-details bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(String);

impl TraceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Culture negotiated for a web request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCulture(pub String);
