//! Datastore reachability probe.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tracing::error;

use labor_health::{HealthCheck, HealthCheckContext, HealthCheckResult};

use crate::db::{DataAccessOptions, DbError};

/// Opens (and immediately closes) a dedicated connection to the datastore.
///
/// Validates reachability and credentials only; no query is issued. The
/// connection is never shared with the application pool or other probes.
#[derive(Debug, Clone)]
pub struct SqlConnectionHealthCheck {
    options: PgConnectOptions,
}

impl SqlConnectionHealthCheck {
    pub fn new(options: PgConnectOptions) -> Self {
        Self { options }
    }

    pub fn from_connection_string(
        data_access: &DataAccessOptions,
        connection_string: &str,
    ) -> Result<Self, DbError> {
        Ok(Self::new(data_access.connect_options(connection_string)?))
    }

    async fn probe(&self) -> Result<(), sqlx::Error> {
        let connection = PgConnection::connect_with(&self.options).await?;
        connection.close().await
    }
}

/// Deadline for the connection attempt itself. Kept short of the registry's
/// budget so this check's own timeout is what reports an overrun.
fn probe_deadline(budget: Duration) -> Duration {
    budget.saturating_sub((budget / 10).min(Duration::from_secs(1)))
}

#[async_trait]
impl HealthCheck for SqlConnectionHealthCheck {
    async fn check_health(&self, context: &HealthCheckContext) -> HealthCheckResult {
        let deadline = probe_deadline(context.timeout);
        let outcome = tokio::time::timeout(deadline, self.probe()).await;
        match outcome {
            Ok(Ok(())) => HealthCheckResult::healthy(),
            Ok(Err(e)) => {
                error!(check = %context.name, error = %e, "Error occurred while connecting to database");
                HealthCheckResult::unhealthy_from(e.to_string(), &e)
            }
            Err(elapsed) => {
                error!(
                    check = %context.name,
                    timeout_ms = deadline.as_millis() as u64,
                    "Timed out while connecting to database"
                );
                HealthCheckResult::unhealthy_from(
                    format!(
                        "connection attempt timed out after {}ms",
                        deadline.as_millis()
                    ),
                    &elapsed,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use labor_health::{HealthChecks, HealthStatus};

    fn refused_check() -> SqlConnectionHealthCheck {
        // Port 1 is reserved and nothing listens there in CI.
        let data_access = DataAccessOptions::new(Duration::from_secs(5), 0, Duration::ZERO);
        SqlConnectionHealthCheck::from_connection_string(
            &data_access,
            "postgres://labor:pw@127.0.0.1:1/labor",
        )
        .unwrap()
    }

    fn context(timeout: Duration) -> HealthCheckContext {
        HealthCheckContext {
            name: "sql".to_string(),
            timeout,
        }
    }

    #[tokio::test]
    async fn refused_connection_is_unhealthy_with_message() {
        let result = refused_check()
            .check_health(&context(Duration::from_secs(5)))
            .await;

        assert_eq!(result.status(), HealthStatus::Unhealthy);
        assert!(!result.description().unwrap_or_default().is_empty());
        assert!(result.exception().is_some());
    }

    #[tokio::test]
    async fn repeated_probes_agree() {
        let check = refused_check();
        let first = check.check_health(&context(Duration::from_secs(5))).await;
        let second = check.check_health(&context(Duration::from_secs(5))).await;
        assert_eq!(first.status(), second.status());
    }

    #[tokio::test]
    async fn elapsed_deadline_is_unhealthy() {
        // 192.0.2.0/24 is TEST-NET-1: packets go nowhere, so only the deadline ends the attempt.
        let data_access = DataAccessOptions::new(Duration::from_secs(5), 0, Duration::ZERO);
        let check = SqlConnectionHealthCheck::from_connection_string(
            &data_access,
            "postgres://labor:pw@192.0.2.1:5432/labor",
        )
        .unwrap();

        let result = check.check_health(&context(Duration::from_millis(50))).await;
        assert_eq!(result.status(), HealthStatus::Unhealthy);
    }

    #[test]
    fn probe_deadline_stays_inside_the_budget() {
        assert_eq!(probe_deadline(Duration::from_secs(60)), Duration::from_secs(59));
        assert_eq!(probe_deadline(Duration::from_millis(50)), Duration::from_millis(45));
        assert_eq!(probe_deadline(Duration::ZERO), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn overrun_is_reported_by_the_check_not_the_registry() {
        let data_access = DataAccessOptions::new(Duration::from_secs(5), 0, Duration::ZERO);
        let check = SqlConnectionHealthCheck::from_connection_string(
            &data_access,
            "postgres://labor:pw@192.0.2.1:5432/labor",
        )
        .unwrap();
        let checks = HealthChecks::new().register_with_timeout("sql", check, Duration::from_millis(200));

        let report = checks.run().await;
        let result = &report.entry("sql").unwrap().result;
        assert_eq!(result.status(), HealthStatus::Unhealthy);
        let description = result.description().unwrap_or_default();
        assert!(
            !description.starts_with("health check timed out"),
            "registry deadline fired first: {description}"
        );
    }
}
