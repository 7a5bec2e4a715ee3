//! HTTP application wiring (Axum router + pipeline).
//!
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `errors.rs`: consistent error responses

use std::sync::Arc;
use std::time::Duration;

use axum::{Extension, Router};
use labor_health::HealthChecks;
use labor_infra::{DataContext, DbError, SqlConnectionHealthCheck};
use tower_http::catch_panic::CatchPanicLayer;
use tracing::info;

use crate::pipeline::{Pipeline, PipelineContext};
use crate::settings::Settings;

pub mod errors;
pub mod routes;

/// Deadline for the `sql` health check.
pub const SQL_CHECK_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared, read-only state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub health: HealthChecks,
    /// Application datastore: lazy pool plus the retry and timeout parameters.
    pub data: DataContext,
}

impl AppState {
    pub fn new(settings: Arc<Settings>, health: HealthChecks, data: DataContext) -> Self {
        Self {
            settings,
            health,
            data,
        }
    }

    /// State with a lazy pool built from `settings`. Needs a Tokio runtime.
    pub fn from_settings(settings: Arc<Settings>, health: HealthChecks) -> Result<Self, DbError> {
        let data =
            DataContext::connect_lazy(&settings.data_access_options(), &settings.sql_connection)?;
        Ok(Self::new(settings, health, data))
    }
}

/// The checks behind `/status`: one `sql` probe against the configured datastore.
pub fn default_health_checks(settings: &Settings) -> Result<HealthChecks, DbError> {
    let sql = SqlConnectionHealthCheck::from_connection_string(
        &settings.data_access_options(),
        &settings.sql_connection,
    )?;
    Ok(HealthChecks::new().register_with_timeout("sql", sql, SQL_CHECK_TIMEOUT))
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(state: AppState) -> Router {
    compose(state, Router::new())
}

/// Wrap the built-in routes plus `business` routes in the request pipeline.
pub fn compose(state: AppState, business: Router) -> Router {
    let settings = state.settings.clone();

    let endpoints = routes::router(&settings)
        .merge(business)
        .layer(CatchPanicLayer::custom(errors::panic_response))
        .layer(Extension(state));

    let pipeline = Pipeline::for_settings(&settings);
    info!(stages = ?pipeline.stage_names(), "request pipeline composed");

    let context = Arc::new(PipelineContext::new(settings, endpoints.clone()));
    pipeline.apply(endpoints, context)
}
