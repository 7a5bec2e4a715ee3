use axum::{
    extract::Path,
    http::StatusCode,
    response::{Html, IntoResponse},
};

/// Status a rendered error page is served with: the code itself for
/// `400..=599`, otherwise `200`.
pub fn page_status(code: u16) -> StatusCode {
    match StatusCode::from_u16(code) {
        Ok(status) if status.is_client_error() || status.is_server_error() => status,
        _ => StatusCode::OK,
    }
}

/// `GET /Errors/{code}`: target of status-code re-execution and of the
/// unhandled-failure redirect.
pub async fn error_page(Path(code): Path<u16>) -> impl IntoResponse {
    let status = page_status(code);
    let reason = StatusCode::from_u16(code)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Error");
    let body = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{code} {reason}</title></head>\n\
         <body>\n<h1>{code}</h1>\n<p>{reason}</p>\n</body>\n</html>\n"
    );
    (status, Html(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_keep_their_status() {
        assert_eq!(page_status(404), StatusCode::NOT_FOUND);
        assert_eq!(page_status(503), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn other_codes_render_with_ok() {
        assert_eq!(page_status(200), StatusCode::OK);
        assert_eq!(page_status(302), StatusCode::OK);
        assert_eq!(page_status(999), StatusCode::OK);
        assert_eq!(page_status(42), StatusCode::OK);
    }
}
