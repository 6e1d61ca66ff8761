//! Query timeout helpers.
//!
//! Every repository call goes through one of these so a stalled connection
//! surfaces as a `Timeout` error instead of hanging a request.

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Default timeout for single queries
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for multi-row writes inside a transaction
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for timeout operations
#[derive(Debug, thiserror::Error)]
pub enum TimeoutError {
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for timeout operations
pub type TimeoutResult<T> = Result<T, TimeoutError>;

/// Run a database future, giving up after `duration`
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> TimeoutResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match timeout(duration, future).await {
        Ok(result) => result.map_err(TimeoutError::Database),
        Err(_) => Err(TimeoutError::Timeout(duration)),
    }
}

/// Run a database future with [`DEFAULT_QUERY_TIMEOUT`]
pub async fn with_default_timeout<F, T>(future: F) -> TimeoutResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    with_timeout(DEFAULT_QUERY_TIMEOUT, future).await
}
