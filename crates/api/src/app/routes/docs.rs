//! Documentation surface under `/swagger`, guarded by the credential gate.

use axum::{
    Json, Router,
    extract::Extension,
    response::{Html, IntoResponse},
    routing::get,
};
use serde_json::{Value, json};

use crate::app::AppState;

pub const DOCUMENT_PATH: &str = "/swagger/v1/swagger.json";

pub fn router() -> Router {
    Router::new()
        .route("/swagger", get(index))
        .route("/swagger/index.html", get(index))
        .route(DOCUMENT_PATH, get(document))
}

fn openapi_document(name: &str, description: &str) -> Value {
    json!({
        "openapi": "3.0.1",
        "info": {
            "title": name,
            "description": description,
            "version": "v1",
        },
        "paths": {
            "/status": {
                "get": {
                    "summary": "Aggregated dependency health",
                    "responses": { "200": { "description": "Health report" } },
                },
            },
            "/api/info": {
                "get": {
                    "summary": "Application name, version and cultures",
                    "responses": { "200": { "description": "Application info" } },
                },
            },
        },
    })
}

pub async fn document(Extension(state): Extension<AppState>) -> Json<Value> {
    let app = &state.settings.app;
    Json(openapi_document(
        &app.application_name,
        &app.application_description,
    ))
}

pub async fn index(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let name = &state.settings.app.application_name;
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{name} API</title></head>\n\
         <body>\n<h1>{name} API</h1>\n<p>OpenAPI document: <a href=\"{DOCUMENT_PATH}\">{DOCUMENT_PATH}</a></p>\n</body>\n</html>\n"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_names_the_application_and_both_paths() {
        let doc = openapi_document("Labor", "Shift planning");
        assert_eq!(doc["info"]["title"], "Labor");
        assert_eq!(doc["info"]["description"], "Shift planning");
        assert_eq!(doc["info"]["version"], "v1");
        assert!(doc["paths"]["/status"].is_object());
        assert!(doc["paths"]["/api/info"].is_object());
    }
}
