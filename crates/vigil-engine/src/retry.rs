//! Retry helper for transient service errors.

use std::future::Future;

use tracing::warn;
use vigil_config::RetryPolicy;
use vigil_services::ServiceError;

/// Run `op`, retrying transient failures per the policy.
///
/// Non-transient errors return immediately; transient errors are retried
/// until the policy's attempt budget is spent, waiting the policy's backoff
/// delay between attempts.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, ServiceError>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T, ServiceError>>,
{
  let mut attempt: u32 = 1;

  loop {
    match op().await {
      Ok(value) => return Ok(value),
      Err(e) if e.is_transient() && attempt < policy.max_attempts => {
        let delay = policy.delay(attempt);
        warn!(
          attempt,
          max_attempts = policy.max_attempts,
          delay_ms = delay.as_millis() as u64,
          error = %e,
          "retrying transient service error"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
      }
      Err(e) => return Err(e),
    }
  }
}
