//! Aggregated health observation and its wire shape.

use std::time::Duration;

use serde::Serialize;

use crate::check::HealthCheckResult;
use crate::status::HealthStatus;

#[derive(Debug, Clone)]
pub struct HealthReportEntry {
    pub name: String,
    pub result: HealthCheckResult,
    pub duration: Duration,
}

/// All registered probes observed once. Built per request, never persisted.
#[derive(Debug, Clone)]
pub struct HealthReport {
    status: HealthStatus,
    entries: Vec<HealthReportEntry>,
    total_duration: Duration,
}

impl HealthReport {
    pub fn new(entries: Vec<HealthReportEntry>, total_duration: Duration) -> Self {
        let status = HealthStatus::worst(entries.iter().map(|e| e.result.status()));
        Self {
            status,
            entries,
            total_duration,
        }
    }

    pub fn status(&self) -> HealthStatus {
        self.status
    }

    /// Entries in registration order.
    pub fn entries(&self) -> &[HealthReportEntry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&HealthReportEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    pub fn to_document(&self) -> StatusDocument<'_> {
        StatusDocument {
            status: self.status.as_str(),
            details: self
                .entries
                .iter()
                .map(|e| StatusDetail {
                    service: &e.name,
                    status: e.result.status().as_str(),
                    description: e.result.description(),
                })
                .collect(),
        }
    }
}

/// JSON body served by the status endpoint.
///
/// ```json
/// {"status": "Healthy", "details": [{"service": "sql", "status": "Healthy", "description": null}]}
/// ```
#[derive(Debug, Serialize)]
pub struct StatusDocument<'a> {
    pub status: &'static str,
    pub details: Vec<StatusDetail<'a>>,
}

#[derive(Debug, Serialize)]
pub struct StatusDetail<'a> {
    pub service: &'a str,
    pub status: &'static str,
    pub description: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(name: &str, result: HealthCheckResult) -> HealthReportEntry {
        HealthReportEntry {
            name: name.to_string(),
            result,
            duration: Duration::from_millis(3),
        }
    }

    #[test]
    fn document_shape_for_a_healthy_report() {
        let report = HealthReport::new(
            vec![entry("sql", HealthCheckResult::healthy())],
            Duration::from_millis(3),
        );

        let doc = serde_json::to_value(report.to_document()).unwrap();
        assert_eq!(
            doc,
            json!({
                "status": "Healthy",
                "details": [{"service": "sql", "status": "Healthy", "description": null}]
            })
        );
    }

    #[test]
    fn overall_status_is_derived_from_entries() {
        let report = HealthReport::new(
            vec![
                entry("sql", HealthCheckResult::healthy()),
                entry("cache", HealthCheckResult::degraded("evicting")),
            ],
            Duration::ZERO,
        );
        assert_eq!(report.status(), HealthStatus::Degraded);
        assert_eq!(
            report.entry("cache").and_then(|e| e.result.description()),
            Some("evicting")
        );
    }

    #[test]
    fn empty_report_is_healthy() {
        let report = HealthReport::new(Vec::new(), Duration::ZERO);
        let doc = serde_json::to_value(report.to_document()).unwrap();
        assert_eq!(doc, json!({"status": "Healthy", "details": []}));
    }
}
