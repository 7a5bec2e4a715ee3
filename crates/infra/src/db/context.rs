use sqlx::PgPool;
use tracing::{info, warn};

use super::{DataAccessOptions, DbError, RetryPolicy};

/// Handle to the application datastore, built once at startup.
///
/// Repositories borrow the pool and run their statements through
/// [`RetryPolicy::run`]; the command timeout is already part of every
/// connection's session settings.
#[derive(Debug, Clone)]
pub struct DataContext {
    pool: PgPool,
    options: DataAccessOptions,
}

impl DataContext {
    pub fn connect_lazy(options: &DataAccessOptions, connection_string: &str) -> Result<Self, DbError> {
        Ok(Self {
            pool: options.connect_lazy(connection_string)?,
            options: options.clone(),
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// The parameters the pool was built with.
    pub fn options(&self) -> &DataAccessOptions {
        &self.options
    }

    pub fn retry(&self) -> RetryPolicy {
        self.options.retry
    }

    /// Open one pooled connection, retrying transient failures.
    ///
    /// Failure is logged, not returned: the service keeps running and the
    /// status endpoint reports the datastore as unhealthy.
    pub async fn warm_up(&self) {
        let pool = &self.pool;
        match self.retry().run("warm_up", || pool.acquire()).await {
            Ok(_connection) => info!("database connection established"),
            Err(e) => warn!(error = %e, "database unreachable at startup"),
        }
    }
}
