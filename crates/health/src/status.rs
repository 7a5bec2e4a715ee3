//! Health status levels.

use serde::{Deserialize, Serialize};

/// Health of a single dependency or of the whole service.
///
/// Variants are declared from worst to best so that `Ord` ranks them by
/// severity; [`HealthStatus::worst`] relies on it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    Unhealthy,
    Degraded,
    Healthy,
}

impl HealthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Unhealthy => "Unhealthy",
            HealthStatus::Degraded => "Degraded",
            HealthStatus::Healthy => "Healthy",
        }
    }

    /// Combine statuses: Unhealthy beats Degraded beats Healthy.
    ///
    /// An empty set is Healthy.
    pub fn worst<I>(statuses: I) -> HealthStatus
    where
        I: IntoIterator<Item = HealthStatus>,
    {
        statuses.into_iter().min().unwrap_or(HealthStatus::Healthy)
    }
}

impl core::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
