use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// SQLSTATE codes worth retrying: serialization/deadlock, resource pressure,
/// and connection-class failures.
const TRANSIENT_SQLSTATES: &[&str] = &[
    "40001", "40P01", "53000", "53300", "57P01", "57P02", "57P03", "08000", "08001", "08003",
    "08004", "08006",
];

/// Retry-on-failure parameters for data-access operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retry_count: u32,
    max_retry_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retry_count: u32, max_retry_delay: Duration) -> Self {
        Self {
            max_retry_count,
            max_retry_delay,
        }
    }

    pub fn max_retry_count(&self) -> u32 {
        self.max_retry_count
    }

    pub fn max_retry_delay(&self) -> Duration {
        self.max_retry_delay
    }

    /// Delay before retry number `attempt` (1-based): `2^attempt - 1` seconds,
    /// capped at the configured ceiling.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let secs = 2u64
            .checked_pow(attempt)
            .map(|v| v - 1)
            .unwrap_or(u64::MAX);
        Duration::from_secs(secs).min(self.max_retry_delay)
    }

    pub fn is_transient(error: &sqlx::Error) -> bool {
        match error {
            sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::Tls(_) => true,
            sqlx::Error::Database(db) => db
                .code()
                .is_some_and(|code| TRANSIENT_SQLSTATES.contains(&&*code)),
            _ => false,
        }
    }

    /// Run `op`, retrying transient failures up to the configured count.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, sqlx::Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_retry_count && Self::is_transient(&e) => {
                    attempt += 1;
                    let delay = self.delay_for(attempt);
                    warn!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient database failure; retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
