//! The probe capability and its result type.

use std::time::Duration;

use async_trait::async_trait;

use crate::status::HealthStatus;

/// Outcome of one probe invocation. Produced fresh on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckResult {
    status: HealthStatus,
    description: Option<String>,
    exception: Option<String>,
}

impl HealthCheckResult {
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            description: None,
            exception: None,
        }
    }

    pub fn degraded(description: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Degraded,
            description: Some(description.into()),
            exception: None,
        }
    }

    /// Unhealthy without a caught failure (e.g. a probe that inspected state
    /// and decided it is bad).
    pub fn unhealthy(description: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            description: Some(description.into()),
            exception: None,
        }
    }

    /// Unhealthy because `error` was caught. The error's rendering is kept as
    /// detail for logs; it is not part of the public status document.
    pub fn unhealthy_from(
        description: impl Into<String>,
        error: &(dyn std::error::Error + 'static),
    ) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            description: Some(description.into()),
            exception: Some(format!("{error:?}")),
        }
    }

    /// Unhealthy because of a caught failure that is not an `Error` value,
    /// such as a panic payload.
    pub fn unhealthy_with_detail(description: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            description: Some(description.into()),
            exception: Some(detail.into()),
        }
    }

    pub fn status(&self) -> HealthStatus {
        self.status
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn exception(&self) -> Option<&str> {
        self.exception.as_deref()
    }
}

/// Per-invocation information handed to a probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckContext {
    /// Name the probe was registered under.
    pub name: String,
    /// Budget for this invocation. The aggregator abandons the probe once it
    /// elapses; probes may use it to bound their own I/O.
    pub timeout: Duration,
}

/// A bounded-time probe of one dependency.
///
/// Implementations must not panic on dependency failure; they report it as an
/// unhealthy result instead.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check_health(&self, context: &HealthCheckContext) -> HealthCheckResult;
}
