//! Failure and status-code decoration for both branches.
//!
//! Web requests get HTML error pages: unhandled failures are redirected to the
//! `500` page (outside development) and bare error statuses are re-executed
//! against the error-page route. API requests get `application/problem+json`.
//!
//! A response counts as undecorated when its status is `400..=599` and its body
//! is known to be empty. Decorating keeps the [`UnhandledFailure`] marker so the
//! exception stages further out still see it.

use axum::{
    Router,
    body::Body,
    extract::Request,
    http::{Extensions, HeaderMap, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body::Body as _;
use tower::ServiceExt;
use tracing::{debug, warn};

use crate::app::errors::{ProblemDetails, UnhandledFailure};
use crate::context::{RequestClassification, RequestCulture, TraceId};

use super::transport;

/// Route template for re-executed error pages.
pub const ERROR_PAGE_TEMPLATE: &str = "/Errors/{0}";

pub(crate) fn error_page_path(status: StatusCode) -> String {
    ERROR_PAGE_TEMPLATE.replace("{0}", &status.as_u16().to_string())
}

fn is_undecorated_error(response: &Response) -> bool {
    let status = response.status();
    (status.is_client_error() || status.is_server_error())
        && response.body().size_hint().exact() == Some(0)
}

/// Headers of `from` that `to` does not set itself, excluding body framing.
fn carry_headers(from: &HeaderMap, to: &mut HeaderMap) {
    for (name, value) in from {
        if name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH {
            continue;
        }
        if !to.contains_key(name) {
            to.insert(name.clone(), value.clone());
        }
    }
}

/// Our own request values, without routing state left behind by the router.
fn context_extensions(req: &Request) -> Extensions {
    let mut extensions = Extensions::new();
    if let Some(classification) = req.extensions().get::<RequestClassification>() {
        extensions.insert(*classification);
    }
    if let Some(trace_id) = req.extensions().get::<TraceId>() {
        extensions.insert(trace_id.clone());
    }
    if let Some(culture) = req.extensions().get::<RequestCulture>() {
        extensions.insert(culture.clone());
    }
    extensions
}

fn trace_id(req: &Request) -> String {
    req.extensions()
        .get::<TraceId>()
        .map(|t| t.as_str().to_string())
        .unwrap_or_else(|| TraceId::new().as_str().to_string())
}

/// Web: turn an unhandled failure into a redirect to the `500` page.
///
/// Runs outside the HSTS stage, so the redirect gets the header here.
pub async fn exception_page(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let secure = transport::is_https(&req);
    let response = next.run(req).await;
    if !UnhandledFailure::is_marked(&response) {
        return response;
    }

    let location = error_page_path(StatusCode::INTERNAL_SERVER_ERROR);
    warn!(%path, %location, "unhandled failure, redirecting to error page");
    match HeaderValue::from_str(&location) {
        Ok(location) => {
            let mut redirect =
                (StatusCode::FOUND, [(header::LOCATION, location)]).into_response();
            if secure {
                transport::add_hsts(&mut redirect);
            }
            redirect
        }
        Err(_) => response,
    }
}

/// Web: re-execute bare error statuses against the error-page route.
///
/// The page is rendered by a fresh `GET` through `endpoints`; the client still
/// sees the original status.
pub async fn status_code_pages(endpoints: &Router, req: Request, next: Next) -> Response {
    let headers = req.headers().clone();
    let extensions = context_extensions(&req);

    let response = next.run(req).await;
    if !is_undecorated_error(&response) {
        return response;
    }

    let status = response.status();
    let path = error_page_path(status);
    let mut page_request = match Request::builder()
        .method(Method::GET)
        .uri(path.as_str())
        .body(Body::empty())
    {
        Ok(page_request) => page_request,
        Err(e) => {
            warn!(error = %e, %path, "could not build error page request");
            return response;
        }
    };
    *page_request.extensions_mut() = extensions;
    for (name, value) in &headers {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            page_request.headers_mut().append(name.clone(), value.clone());
        }
    }

    debug!(status = status.as_u16(), %path, "re-executing error page");
    let mut page = match endpoints.clone().oneshot(page_request).await {
        Ok(page) => page,
        Err(never) => match never {},
    };
    *page.status_mut() = status;
    carry_headers(response.headers(), page.headers_mut());
    if UnhandledFailure::is_marked(&response) {
        page.extensions_mut().insert(UnhandledFailure);
    }
    page
}

/// API: unhandled failures become a `500` problem-details body.
pub async fn problem_details_exceptions(req: Request, next: Next) -> Response {
    let instance = req.uri().path().to_string();
    let trace_id = trace_id(&req);

    let response = next.run(req).await;
    if !UnhandledFailure::is_marked(&response) {
        return response;
    }

    let mut problem =
        ProblemDetails::new(StatusCode::INTERNAL_SERVER_ERROR, instance, trace_id).into_response();
    problem.extensions_mut().insert(UnhandledFailure);
    problem
}

/// API: bare error statuses become a problem-details body with that status.
pub async fn problem_details_status_codes(req: Request, next: Next) -> Response {
    let instance = req.uri().path().to_string();
    let trace_id = trace_id(&req);

    let response = next.run(req).await;
    if !is_undecorated_error(&response) {
        return response;
    }

    let (parts, _) = response.into_parts();
    let mut problem = ProblemDetails::new(parts.status, instance, trace_id).into_response();
    carry_headers(&parts.headers, problem.headers_mut());
    problem.extensions_mut().extend(parts.extensions);
    problem
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_page_path_fills_the_template() {
        assert_eq!(error_page_path(StatusCode::NOT_FOUND), "/Errors/404");
        assert_eq!(error_page_path(StatusCode::INTERNAL_SERVER_ERROR), "/Errors/500");
    }

    #[test]
    fn empty_error_statuses_are_undecorated() {
        assert!(is_undecorated_error(&StatusCode::NOT_FOUND.into_response()));
        assert!(is_undecorated_error(&StatusCode::BAD_GATEWAY.into_response()));
    }

    #[test]
    fn bodies_and_successes_are_left_alone() {
        assert!(!is_undecorated_error(&StatusCode::NO_CONTENT.into_response()));
        assert!(!is_undecorated_error(
            &(StatusCode::NOT_FOUND, "no such shift").into_response()
        ));
        assert!(!is_undecorated_error(
            &StatusCode::TEMPORARY_REDIRECT.into_response()
        ));
    }

    #[test]
    fn carried_headers_skip_framing_and_existing_values() {
        let mut from = HeaderMap::new();
        from.insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
        from.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        from.insert(header::ALLOW, HeaderValue::from_static("GET"));

        let mut to = HeaderMap::new();
        to.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
        to.insert(header::ALLOW, HeaderValue::from_static("GET,HEAD"));
        carry_headers(&from, &mut to);

        assert_eq!(to[header::WWW_AUTHENTICATE], "Basic");
        assert_eq!(to[header::CONTENT_TYPE], "text/html");
        assert_eq!(to[header::ALLOW], "GET,HEAD");
    }
}
