//! Infrastructure layer: datastore connection settings and dependency probes.

pub mod db;
pub mod health;

pub use db::{DataAccessOptions, DataContext, DbError, RetryPolicy};
pub use health::SqlConnectionHealthCheck;
