use std::fmt::Display;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// How many times a request may be attempted and how long to wait in between.
///
/// The default is a single attempt with no backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    /// Delay before retry `n` is `delays[n - 1]`; the last entry repeats.
    pub delays: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::single_attempt()
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            delays: Vec::new(),
        }
    }

    #[must_use]
    pub fn new(max_attempts: usize, delays: Vec<Duration>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delays,
        }
    }

    fn delay_before_retry(&self, retry: usize) -> Duration {
        self.delays
            .get(retry.saturating_sub(1))
            .or_else(|| self.delays.last())
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}

/// Retry an async operation, but only while its failures are transient.
///
/// # Arguments
/// * `operation` - The async operation to retry
/// * `policy` - Attempt budget and delays
/// * `is_transient` - Decides whether a failure is worth another attempt
///
/// # Returns
/// The first success, the first terminal error, or the last transient error
/// once the attempt budget is spent
pub async fn retry_with_backoff<F, Fut, T, E>(
    mut operation: F,
    policy: &RetryPolicy,
    is_transient: impl Fn(&E) -> bool,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt < max_attempts && is_transient(&e) => {
                let delay = policy.delay_before_retry(attempt);
                warn!(
                    "Request failed (attempt {attempt}/{max_attempts}): {e}. Retrying after {}ms...",
                    delay.as_millis()
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
