//! Database adapters (connection options, pool wiring, retry parameters).
//!
//! The service never talks to the datastore on the request path itself; it
//! hands these options to the data-access layer at construction time.

mod context;
mod options;
mod retry;

pub use context::DataContext;
pub use options::DataAccessOptions;
pub use retry::RetryPolicy;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(#[source] sqlx::Error),
}
