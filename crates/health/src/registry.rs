//! Named probe registry and concurrent runner.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::check::{HealthCheck, HealthCheckContext, HealthCheckResult};
use crate::report::{HealthReport, HealthReportEntry};
use crate::status::HealthStatus;

/// Budget applied to probes registered without an explicit timeout.
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
struct Registration {
    name: String,
    check: Arc<dyn HealthCheck>,
    timeout: Duration,
}

/// Registered probes, keyed by name, in registration order.
///
/// Cheap to clone; probes are shared behind `Arc`.
#[derive(Clone, Default)]
pub struct HealthChecks {
    registrations: Vec<Registration>,
}

impl core::fmt::Debug for HealthChecks {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.registrations.iter().map(|r| (&r.name, r.timeout)))
            .finish()
    }
}

impl HealthChecks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(self, name: impl Into<String>, check: impl HealthCheck + 'static) -> Self {
        self.register_with_timeout(name, check, DEFAULT_CHECK_TIMEOUT)
    }

    /// Register `check` under `name`. Registering a name twice replaces the
    /// earlier probe but keeps its position.
    pub fn register_with_timeout(
        mut self,
        name: impl Into<String>,
        check: impl HealthCheck + 'static,
        timeout: Duration,
    ) -> Self {
        let registration = Registration {
            name: name.into(),
            check: Arc::new(check),
            timeout,
        };
        match self
            .registrations
            .iter_mut()
            .find(|r| r.name == registration.name)
        {
            Some(existing) => *existing = registration,
            None => self.registrations.push(registration),
        }
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.registrations.iter().map(|r| r.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Run every probe concurrently and fold the results.
    ///
    /// A probe that overruns its budget or panics is reported as Unhealthy; it
    /// never fails the report as a whole.
    pub async fn run(&self) -> HealthReport {
        let started = Instant::now();
        let entries = join_all(self.registrations.iter().map(run_one)).await;
        let report = HealthReport::new(entries, started.elapsed());

        for entry in report.entries() {
            if entry.result.status() != HealthStatus::Healthy {
                warn!(
                    service = %entry.name,
                    status = %entry.result.status(),
                    description = entry.result.description().unwrap_or_default(),
                    exception = entry.result.exception().unwrap_or_default(),
                    "health check reported a problem"
                );
            }
        }
        debug!(
            status = %report.status(),
            total_ms = report.total_duration().as_millis() as u64,
            "health report computed"
        );

        report
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    }
}

async fn run_one(registration: &Registration) -> HealthReportEntry {
    let context = HealthCheckContext {
        name: registration.name.clone(),
        timeout: registration.timeout,
    };
    let started = Instant::now();

    let probe = AssertUnwindSafe(registration.check.check_health(&context)).catch_unwind();
    let result = match tokio::time::timeout(registration.timeout, probe).await {
        Ok(Ok(result)) => result,
        Ok(Err(panic)) => {
            HealthCheckResult::unhealthy_with_detail("health check panicked", panic_message(&*panic))
        }
        Err(elapsed) => HealthCheckResult::unhealthy_from(
            format!(
                "health check timed out after {}ms",
                registration.timeout.as_millis()
            ),
            &elapsed,
        ),
    };

    HealthReportEntry {
        name: registration.name.clone(),
        result,
        duration: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed(HealthCheckResult);

    #[async_trait]
    impl HealthCheck for Fixed {
        async fn check_health(&self, _context: &HealthCheckContext) -> HealthCheckResult {
            self.0.clone()
        }
    }

    struct Hangs;

    #[async_trait]
    impl HealthCheck for Hangs {
        async fn check_health(&self, _context: &HealthCheckContext) -> HealthCheckResult {
            std::future::pending::<()>().await;
            HealthCheckResult::healthy()
        }
    }

    struct Panics;

    #[async_trait]
    impl HealthCheck for Panics {
        async fn check_health(&self, _context: &HealthCheckContext) -> HealthCheckResult {
            panic!("probe blew up");
        }
    }

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl HealthCheck for Counting {
        async fn check_health(&self, context: &HealthCheckContext) -> HealthCheckResult {
            assert_eq!(context.name, "counted");
            self.0.fetch_add(1, Ordering::SeqCst);
            HealthCheckResult::healthy()
        }
    }

    #[tokio::test]
    async fn all_healthy() {
        let checks = HealthChecks::new()
            .register("a", Fixed(HealthCheckResult::healthy()))
            .register("b", Fixed(HealthCheckResult::healthy()));
        assert_eq!(checks.run().await.status(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn one_unhealthy_rest_healthy() {
        let checks = HealthChecks::new()
            .register("a", Fixed(HealthCheckResult::healthy()))
            .register("b", Fixed(HealthCheckResult::unhealthy("down")))
            .register("c", Fixed(HealthCheckResult::healthy()));
        assert_eq!(checks.run().await.status(), HealthStatus::Unhealthy);
    }

    #[tokio::test]
    async fn one_degraded_rest_healthy() {
        let checks = HealthChecks::new()
            .register("a", Fixed(HealthCheckResult::degraded("slow")))
            .register("b", Fixed(HealthCheckResult::healthy()));
        assert_eq!(checks.run().await.status(), HealthStatus::Degraded);
    }

    #[tokio::test]
    async fn mixed_degraded_and_unhealthy() {
        let checks = HealthChecks::new()
            .register("a", Fixed(HealthCheckResult::degraded("slow")))
            .register("b", Fixed(HealthCheckResult::unhealthy("down")))
            .register("c", Fixed(HealthCheckResult::healthy()));
        assert_eq!(checks.run().await.status(), HealthStatus::Unhealthy);
    }

    #[tokio::test]
    async fn overrunning_probe_is_unhealthy_not_fatal() {
        let checks = HealthChecks::new()
            .register("ok", Fixed(HealthCheckResult::healthy()))
            .register_with_timeout("stuck", Hangs, Duration::from_millis(20));

        let report = checks.run().await;
        assert_eq!(report.status(), HealthStatus::Unhealthy);

        let stuck = report.entry("stuck").unwrap();
        assert_eq!(stuck.result.status(), HealthStatus::Unhealthy);
        assert_eq!(
            stuck.result.description(),
            Some("health check timed out after 20ms")
        );
        assert!(stuck.result.exception().is_some());
        assert_eq!(
            report.entry("ok").unwrap().result.status(),
            HealthStatus::Healthy
        );
    }

    #[tokio::test]
    async fn panicking_probe_is_unhealthy() {
        let checks = HealthChecks::new().register("boom", Panics);
        let report = checks.run().await;
        let result = &report.entry("boom").unwrap().result;
        assert_eq!(result.status(), HealthStatus::Unhealthy);
        assert_eq!(result.description(), Some("health check panicked"));
        assert_eq!(result.exception(), Some("probe blew up"));
    }

    #[tokio::test]
    async fn entries_keep_registration_order() {
        let checks = HealthChecks::new()
            .register("z", Fixed(HealthCheckResult::healthy()))
            .register("a", Fixed(HealthCheckResult::healthy()))
            .register("m", Fixed(HealthCheckResult::healthy()));
        let report = checks.run().await;
        let names: Vec<_> = report.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["z", "a", "m"]);
    }

    #[tokio::test]
    async fn re_registering_replaces_in_place() {
        let checks = HealthChecks::new()
            .register("sql", Fixed(HealthCheckResult::unhealthy("old")))
            .register("cache", Fixed(HealthCheckResult::healthy()))
            .register("sql", Fixed(HealthCheckResult::healthy()));
        assert_eq!(checks.names().collect::<Vec<_>>(), ["sql", "cache"]);
        assert_eq!(checks.run().await.status(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn probes_run_on_every_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let checks = HealthChecks::new().register("counted", Counting(calls.clone()));

        let first = checks.run().await;
        let second = checks.run().await;

        assert_eq!(first.status(), second.status());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
