//! One summary line per request.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::info;

use crate::context::TraceId;

pub async fn request_logging(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let trace_id = req
        .extensions()
        .get::<TraceId>()
        .map(|t| t.as_str().to_string())
        .unwrap_or_default();
    let started = Instant::now();

    let response = next.run(req).await;

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    let status = response.status().as_u16();
    info!(
        %method,
        %path,
        status,
        elapsed_ms,
        %trace_id,
        "HTTP {method} {path} responded {status} in {elapsed_ms:.4} ms"
    );
    response
}
