//! Serves files under the web root before routing sees the request.

use axum::{
    body::Body,
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};
use tower::ServiceExt;
use tower_http::services::ServeDir;

/// `GET`/`HEAD` requests that name an existing file are answered here.
/// Anything else falls through to the rest of the pipeline.
pub async fn static_files(files: &ServeDir, req: Request, next: Next) -> Response {
    if req.method() != Method::GET && req.method() != Method::HEAD {
        return next.run(req).await;
    }

    let mut probe = Request::new(Body::empty());
    *probe.method_mut() = req.method().clone();
    *probe.uri_mut() = req.uri().clone();
    *probe.headers_mut() = req.headers().clone();

    let served = match files.clone().oneshot(probe).await {
        Ok(served) => served,
        Err(never) => match never {},
    };
    match served.status() {
        StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED => next.run(req).await,
        _ => served.map(Body::new),
    }
}
