//! Request context, HTTPS redirection and strict-transport enforcement.

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::context::{RequestClassification, TraceId};
use crate::settings::Settings;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const HSTS_VALUE: &str = "max-age=2592000";

/// Classify the request and give it a trace identifier.
pub async fn request_context(mut req: Request, next: Next) -> Response {
    let classification = RequestClassification::classify(req.uri().path(), req.headers());
    let trace_id = TraceId::new();

    req.extensions_mut().insert(classification);
    req.extensions_mut().insert(trace_id.clone());

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(trace_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

pub(crate) fn is_https(req: &Request) -> bool {
    if req.uri().scheme_str() == Some("https") {
        return true;
    }
    req.headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
}

/// Host without its port; keeps IPv6 brackets.
fn host_name(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    host.split(':').next().unwrap_or(host)
}

fn https_location(host: &str, port: u16, path_and_query: &str) -> String {
    let host = host_name(host);
    if port == 443 {
        format!("https://{host}{path_and_query}")
    } else {
        format!("https://{host}:{port}{path_and_query}")
    }
}

/// `307` to the HTTPS origin when an HTTPS port is configured.
pub async fn https_redirection(settings: &Settings, req: Request, next: Next) -> Response {
    let Some(port) = settings.hosting.https_port else {
        return next.run(req).await;
    };
    if is_https(&req) {
        return next.run(req).await;
    }
    let Some(host) = req.headers().get(header::HOST).and_then(|v| v.to_str().ok()) else {
        return next.run(req).await;
    };

    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or("/");
    match HeaderValue::from_str(&https_location(host, port, path_and_query)) {
        Ok(location) => {
            (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response()
        }
        Err(_) => next.run(req).await,
    }
}

pub(crate) fn add_hsts(response: &mut Response) {
    if !response.headers().contains_key(header::STRICT_TRANSPORT_SECURITY) {
        response.headers_mut().insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS_VALUE),
        );
    }
}

/// Add `Strict-Transport-Security` to responses served over HTTPS.
pub async fn hsts(req: Request, next: Next) -> Response {
    let secure = is_https(&req);
    let mut response = next.run(req).await;
    if secure {
        add_hsts(&mut response);
    }
    response
}
