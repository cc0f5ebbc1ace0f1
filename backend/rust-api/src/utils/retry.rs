use std::fmt;
use std::time::Duration;

use crate::config::RetrySettings;
use crate::error::GenerationError;

/// Exponential backoff schedule plus the predicate deciding which errors are worth retrying.
///
/// Retry `i` (0-indexed) waits `base_backoff * multiplier^i`, capped by `max_backoff`
/// when one is set. At most `max_retries` retries happen, so an operation runs
/// `max_retries + 1` times in the worst case.
pub struct RetryPolicy<E> {
    pub max_retries: usize,
    pub base_backoff: Duration,
    pub multiplier: u32,
    pub max_backoff: Option<Duration>,
    pub retry_if: fn(&E) -> bool,
}

impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for RetryPolicy<E> {}

impl<E> fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("base_backoff", &self.base_backoff)
            .field("multiplier", &self.multiplier)
            .field("max_backoff", &self.max_backoff)
            .finish()
    }
}

impl<E> RetryPolicy<E> {
    pub fn new(max_retries: usize, base_backoff: Duration, retry_if: fn(&E) -> bool) -> Self {
        Self {
            max_retries,
            base_backoff,
            multiplier: 2,
            max_backoff: None,
            retry_if,
        }
    }

    /// Single attempt, never waits.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO, |_| false)
    }

    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = Some(max_backoff);
        self
    }

    pub fn delay_for(&self, retry: usize) -> Duration {
        let factor = self
            .multiplier
            .saturating_pow(u32::try_from(retry).unwrap_or(u32::MAX));
        let delay = self.base_backoff.saturating_mul(factor);
        match self.max_backoff {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }

    /// Every wait the policy can produce, in order.
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_retries).map(|i| self.delay_for(i)).collect()
    }

    pub fn should_retry(&self, retry: usize, error: &E) -> bool {
        retry < self.max_retries && (self.retry_if)(error)
    }
}

impl RetryPolicy<GenerationError> {
    /// 3 retries on rate limiting, waiting 2s, 4s, 8s.
    pub fn rate_limit_backoff() -> Self {
        Self::new(3, Duration::from_millis(2000), GenerationError::is_retryable)
    }

    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self::new(
            settings.max_retries,
            Duration::from_millis(settings.base_delay_ms),
            GenerationError::is_retryable,
        )
    }
}

pub async fn retry_with_policy<F, Fut, T, E>(policy: &RetryPolicy<E>, f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    retry_with_policy_notify(policy, |_, _, _| {}, f).await
}

/// Same as [`retry_with_policy`], calling `on_retry(retry_index, wait, error)` before each wait.
pub async fn retry_with_policy_notify<F, Fut, T, E, N>(
    policy: &RetryPolicy<E>,
    mut on_retry: N,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    N: FnMut(usize, Duration, &E),
    E: fmt::Display,
{
    let mut retry = 0;

    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !policy.should_retry(retry, &err) {
                    return Err(err);
                }

                let wait = policy.delay_for(retry);
                tracing::warn!(
                    attempt = retry + 1,
                    max_retries = policy.max_retries,
                    delay_ms = wait.as_millis() as u64,
                    "Retryable failure, backing off: {}",
                    err
                );
                on_retry(retry, wait, &err);
                tokio::time::sleep(wait).await;
                retry += 1;
            }
        }
    }
}
