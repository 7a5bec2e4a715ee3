//! `labor-health`: dependency health probes and their aggregation.
//!
//! A probe is anything implementing [`HealthCheck`]. Probes are registered by
//! name in [`HealthChecks`], which runs them concurrently under a time budget
//! and folds the results into a [`HealthReport`].

pub mod check;
pub mod registry;
pub mod report;
pub mod status;

pub use check::{HealthCheck, HealthCheckContext, HealthCheckResult};
pub use registry::{HealthChecks, DEFAULT_CHECK_TIMEOUT};
pub use report::{HealthReport, HealthReportEntry, StatusDocument};
pub use status::HealthStatus;
