use std::time::Duration;

use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by clock store calls regardless of the underlying cache.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The call did not finish within its deadline.
    #[error("storage operation `{operation}` timed out after {limit:?}")]
    Timeout {
        /// Store method that was running.
        operation: &'static str,
        /// Deadline that elapsed.
        limit: Duration,
    },
}

/// Bound a store future by `limit`, mapping an elapsed deadline to [`StorageError::Timeout`].
pub async fn with_deadline<T, F>(operation: &'static str, limit: Duration, work: F) -> StorageResult<T>
where
    F: std::future::Future<Output = StorageResult<T>>,
{
    match tokio::time::timeout(limit, work).await {
        Ok(result) => result,
        Err(_) => Err(StorageError::Timeout { operation, limit }),
    }
}
