use std::future::Future;
use std::time::Duration;

use crate::error::AppError;

/// Run a store operation with an upper time bound.
///
/// On expiry the future is dropped, which rolls back any open transaction it owns.
pub async fn bounded<T, F>(limit: Duration, operation: &str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(format!(
            "{operation} exceeded {}ms",
            limit.as_millis()
        ))),
    }
}
