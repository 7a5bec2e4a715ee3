#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use labor_api::app::{self, AppState};
use labor_api::settings::Settings;
use labor_health::{HealthCheck, HealthCheckContext, HealthCheckResult, HealthChecks};

/// Nothing listens on port 1.
pub const REFUSED_CONNECTION: &str = "postgres://labor:pw@127.0.0.1:1/labor";

pub fn settings(pairs: &[(&str, &str)]) -> Settings {
    let mut values: HashMap<String, String> = HashMap::from([
        ("CONNECTIONSTRINGS__SQLCONNECTION".to_string(), REFUSED_CONNECTION.to_string()),
        ("APP_WEB_ROOT".to_string(), "tests/no-web-root".to_string()),
    ]);
    for (key, value) in pairs {
        values.insert(key.to_string(), value.to_string());
    }
    Settings::from_map(&values).unwrap()
}

pub struct AlwaysHealthy;

#[async_trait]
impl HealthCheck for AlwaysHealthy {
    async fn check_health(&self, _context: &HealthCheckContext) -> HealthCheckResult {
        HealthCheckResult::healthy()
    }
}

pub fn healthy_checks() -> HealthChecks {
    HealthChecks::new().register("sql", AlwaysHealthy)
}

pub fn app_with(settings: Settings, health: HealthChecks, business: Router) -> Router {
    let state = AppState::from_settings(Arc::new(settings), health).unwrap();
    app::compose(state, business)
}

pub fn app(settings: Settings) -> Router {
    app_with(settings, healthy_checks(), Router::new())
}
