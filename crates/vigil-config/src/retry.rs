use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryBackoff {
  Constant,
  Linear,
  Exponential,
}

/// Retry policy for transient query-service errors.
///
/// This is the only retry policy in the pipeline; every other step is
/// single-attempt and surfaces its failure to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
  /// Total number of attempts, including the first.
  pub max_attempts: u32,
  /// Delay before the first retry.
  pub interval_secs: u64,
  pub backoff: RetryBackoff,
  /// Growth factor applied per attempt for exponential backoff.
  pub multiplier: f64,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 6,
      interval_secs: 2,
      backoff: RetryBackoff::Exponential,
      multiplier: 2.0,
    }
  }
}

impl RetryPolicy {
  /// Delay to wait after the given failed attempt (1-based).
  pub fn delay(&self, attempt: u32) -> Duration {
    let base = Duration::from_secs(self.interval_secs);
    match self.backoff {
      RetryBackoff::Constant => base,
      RetryBackoff::Linear => base.saturating_mul(attempt),
      RetryBackoff::Exponential => {
        let factor = self.multiplier.powi(attempt.saturating_sub(1) as i32);
        base.mul_f64(factor)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_policy() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_attempts, 6);
    assert_eq!(policy.interval_secs, 2);
    assert_eq!(policy.backoff, RetryBackoff::Exponential);
  }

  #[test]
  fn test_exponential_delays() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.delay(1), Duration::from_secs(2));
    assert_eq!(policy.delay(2), Duration::from_secs(4));
    assert_eq!(policy.delay(3), Duration::from_secs(8));
    assert_eq!(policy.delay(5), Duration::from_secs(32));
  }

  #[test]
  fn test_constant_and_linear_delays() {
    let constant = RetryPolicy {
      backoff: RetryBackoff::Constant,
      ..RetryPolicy::default()
    };
    assert_eq!(constant.delay(4), Duration::from_secs(2));

    let linear = RetryPolicy {
      backoff: RetryBackoff::Linear,
      ..RetryPolicy::default()
    };
    assert_eq!(linear.delay(3), Duration::from_secs(6));
  }
}
