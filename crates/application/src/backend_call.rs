use std::future::Future;
use std::time::Duration;

use rolegrid_core::{AppError, AppResult};

/// Awaits a backend call, failing with an internal error once `timeout` elapses.
pub(crate) async fn with_timeout<T, F>(timeout: Duration, operation: &str, call: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Internal(format!(
            "{operation} timed out after {} ms",
            timeout.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rolegrid_core::{AppError, AppResult};

    use super::with_timeout;

    #[tokio::test(start_paused = true)]
    async fn elapsed_call_maps_to_internal_error() {
        let result: AppResult<()> = with_timeout(Duration::from_millis(50), "GetScreenGroup", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert_eq!(
            result,
            Err(AppError::Internal(
                "GetScreenGroup timed out after 50 ms".to_owned()
            ))
        );
    }

    #[tokio::test]
    async fn completed_call_passes_its_result_through() {
        let result = with_timeout(Duration::from_secs(1), "GetUserGroup", async {
            Err::<(), _>(AppError::NotFound("missing".to_owned()))
        })
        .await;

        assert_eq!(result, Err(AppError::NotFound("missing".to_owned())));
    }
}
