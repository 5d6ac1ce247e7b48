//! Bounded retry with a fixed delay between attempts.

use std::future::Future;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Pause between two consecutive attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 7,
            delay: Duration::from_millis(1500),
        }
    }
}

/// Every attempt failed; carries the error of the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

/// Run `op` until it succeeds or `policy.max_attempts` attempts have failed.
///
/// `op` receives the 1-based attempt number. The delay is only taken between
/// attempts, never after the last failure.
pub async fn attempt<T, E, F, Fut>(policy: RetryPolicy, op: F) -> Result<T, RetryExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    attempt_while(policy, op, |_| true).await
}

/// Like [`attempt`], but stops at the first error `retryable` refuses.
pub async fn attempt_while<T, E, F, Fut, R>(
    policy: RetryPolicy,
    mut op: F,
    retryable: R,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    R: Fn(&E) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt_no = 1;
    loop {
        match op(attempt_no).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt_no >= max_attempts || !retryable(&e) => {
                return Err(RetryExhausted {
                    attempts: attempt_no,
                    last_error: e,
                })
            }
            Err(e) => {
                debug!(attempt = attempt_no, max_attempts, error = %e, "attempt failed, retrying");
                tokio::time::sleep(policy.delay).await;
                attempt_no += 1;
            }
        }
    }
}
