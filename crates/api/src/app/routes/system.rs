use axum::{Json, extract::Extension};
use serde::Serialize;
use serde_json::Value;

use crate::app::AppState;
use crate::app::errors::AppError;

/// `GET /status`: run every registered check and report. Always `200`; the
/// body carries the verdict.
pub async fn status(Extension(state): Extension<AppState>) -> Result<Json<Value>, AppError> {
    let report = state.health.run().await;
    let document = serde_json::to_value(report.to_document()).map_err(anyhow::Error::from)?;
    Ok(Json(document))
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub name: String,
    pub description: String,
    pub version: &'static str,
    pub cultures: Vec<String>,
}

pub async fn info(Extension(state): Extension<AppState>) -> Json<InfoResponse> {
    let app = &state.settings.app;
    Json(InfoResponse {
        name: app.application_name.clone(),
        description: app.application_description.clone(),
        version: env!("CARGO_PKG_VERSION"),
        cultures: app.supported_cultures.clone(),
    })
}
