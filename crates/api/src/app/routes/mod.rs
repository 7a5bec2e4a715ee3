use axum::{Router, routing::get};

use crate::settings::Settings;

pub mod docs;
pub mod errors;
pub mod system;

/// Built-in endpoints. The documentation surface is only mounted when enabled.
pub fn router(settings: &Settings) -> Router {
    let router = Router::new()
        .route("/status", get(system::status))
        .route("/api/info", get(system::info))
        .route("/Errors/:code", get(errors::error_page));

    if settings.swagger.enabled {
        router.merge(docs::router())
    } else {
        router
    }
}
