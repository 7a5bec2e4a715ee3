use std::str::FromStr;
use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use super::{DbError, RetryPolicy};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Pool acquire bound used when the command timeout is zero ("no limit").
const UNBOUNDED_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Resiliency parameters handed to the data-access layer.
///
/// Values are passed through unchanged: the command timeout becomes the
/// server-side `statement_timeout`, and the retry parameters travel as a
/// [`RetryPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataAccessOptions {
    pub command_timeout: Duration,
    pub retry: RetryPolicy,
    pub max_connections: u32,
}

impl DataAccessOptions {
    pub fn new(command_timeout: Duration, max_retry_count: u32, max_retry_delay: Duration) -> Self {
        Self {
            command_timeout,
            retry: RetryPolicy::new(max_retry_count, max_retry_delay),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Parse `connection_string` and apply the command timeout to it.
    pub fn connect_options(&self, connection_string: &str) -> Result<PgConnectOptions, DbError> {
        let options =
            PgConnectOptions::from_str(connection_string).map_err(DbError::InvalidConnectionString)?;
        Ok(options.options([(
            "statement_timeout",
            format!("{}ms", self.command_timeout.as_millis()),
        )]))
    }

    /// How long a caller waits for a pooled connection. A zero command
    /// timeout disables `statement_timeout` server-side, so it must not turn
    /// into an immediate acquire failure here.
    pub fn acquire_timeout(&self) -> Duration {
        if self.command_timeout.is_zero() {
            UNBOUNDED_ACQUIRE_TIMEOUT
        } else {
            self.command_timeout
        }
    }

    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout())
    }

    /// Build a pool that connects on first use, so the service can start while
    /// the datastore is still unreachable.
    pub fn connect_lazy(&self, connection_string: &str) -> Result<PgPool, DbError> {
        let options = self.connect_options(connection_string)?;
        Ok(self.pool_options().connect_lazy_with(options))
    }
}
