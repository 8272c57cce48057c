//! Lock-contention retry logic.
//!
//! Several reviewers may share one database file. `SQLite` serializes writers,
//! so an insert can fail with `database is locked` / `SQLITE_BUSY` even with a
//! busy timeout. Those failures are retried with capped exponential backoff;
//! every other error is returned immediately.

use std::future::Future;
use std::time::Duration;

/// Configuration for retry behavior on lock contention.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }
}

/// Detect `SQLite` lock contention.
///
/// The predicate is intentionally narrow to avoid retrying genuine
/// SQL or constraint errors.
pub fn is_lock_contention(e: &libsql::Error) -> bool {
    let msg = e.to_string().to_ascii_lowercase();
    msg.contains("database is locked")
        || msg.contains("database table is locked")
        || msg.contains("sqlite_busy")
}

/// Run `op` until it succeeds, fails with a non-contention error, or the
/// attempts are exhausted.
///
/// # Errors
///
/// Returns the last error from `op`.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, mut op: F) -> Result<T, libsql::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, libsql::Error>>,
{
    let mut delay = config.base_delay;
    let mut attempt = 1;
    loop {
        match op().await {
            Err(e) if is_lock_contention(&e) && attempt < config.max_attempts => {
                tracing::debug!(
                    attempt,
                    max_attempts = config.max_attempts,
                    ?delay,
                    "Database locked, retrying: {e}"
                );
                tokio::time::sleep(delay).await;
                delay = std::cmp::min(delay * 2, config.max_delay);
                attempt += 1;
            }
            result => return result,
        }
    }
}
