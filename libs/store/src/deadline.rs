//! Per-operation deadlines

use std::{future::Future, time::Duration};
use tokio::time::timeout;
use tracing::warn;

use crate::error::{StoreError, StoreResult};

/// Bound applied to each store operation unless configured otherwise
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Run `fut`, failing with [`StoreError::TransientIo`] once `limit` elapses.
///
/// The future is dropped on timeout, which returns its pooled connection and
/// rolls back any open transaction.
pub async fn within<T, F>(limit: Duration, operation: &'static str, fut: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!("Store operation {} exceeded {:?}", operation, limit);
            Err(StoreError::TransientIo(format!(
                "{} timed out after {:?}",
                operation, limit
            )))
        }
    }
}
