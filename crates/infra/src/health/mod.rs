//! Dependency probes backed by infrastructure.

mod sql;

pub use sql::SqlConnectionHealthCheck;
