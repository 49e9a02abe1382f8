use std::time::Duration;

use crate::error::AppError;

/// Exponential backoff schedule with a hard attempt ceiling.
///
/// The wait for attempt `n` is `base_delay * multiplier^n`, clamped to
/// `max_delay`. A `max_attempts` of zero means unlimited attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    base_delay: Duration,
    max_delay: Duration,
    max_attempts: i32,
    multiplier: f64,
}

impl RetryPolicy {
    /// Build a policy, substituting defaults for non-positive parameters
    /// (base 5s, max 15s, multiplier 2.0).
    pub fn new(base_delay: Duration, max_delay: Duration, max_attempts: i32, multiplier: f64) -> Self {
        let base_delay = if base_delay.is_zero() {
            Duration::from_secs(5)
        } else {
            base_delay
        };
        let max_delay = if max_delay.is_zero() {
            Duration::from_secs(15)
        } else {
            max_delay
        };
        let multiplier = if multiplier <= 0.0 { 2.0 } else { multiplier };
        Self {
            base_delay,
            max_delay,
            max_attempts,
            multiplier,
        }
    }

    /// Duration to wait before the given retry attempt (0-indexed).
    pub fn wait_duration(&self, attempt: i32) -> Result<Duration, AppError> {
        self.validate(attempt)?;

        let delay = self.base_delay.as_secs_f64() * self.multiplier.powi(attempt);
        let capped = delay.min(self.max_delay.as_secs_f64());
        Ok(Duration::from_secs_f64(capped))
    }

    fn validate(&self, attempt: i32) -> Result<(), AppError> {
        if attempt < 0 {
            return Err(AppError::InvalidAttempt);
        }
        if self.max_attempts > 0 && attempt >= self.max_attempts {
            return Err(AppError::RetryExhausted);
        }
        Ok(())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(30), 5, 2.0)
    }
}
