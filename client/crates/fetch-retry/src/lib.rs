//! Exponential backoff for fallible async operations.
//!
//! The helper re-invokes a zero-argument async operation until it succeeds,
//! the retry budget is spent, or the error reports itself as permanent. Each
//! wait doubles the previous one. Sleeping is delegated to a [`Sleeper`] so
//! callers and tests can observe the backoff without wall-clock delays.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

const DEFAULT_RETRIES: u32 = 3;
const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1_000);

/// Classifies an error as transient (worth retrying) or permanent.
pub trait Retryable {
    /// Return whether another attempt may succeed.
    fn is_retryable(&self) -> bool;
}

/// Retry budget and initial backoff for [`fetch_with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt.
    pub retries: u32,
    /// Delay before the first retry; doubled after every retry.
    pub initial_delay: Duration,
}

impl RetryPolicy {
    /// Build a policy from a retry count and initial delay.
    #[must_use]
    pub const fn new(retries: u32, initial_delay: Duration) -> Self {
        Self {
            retries,
            initial_delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRIES, DEFAULT_INITIAL_DELAY)
    }
}

/// Async sleeping abstraction used between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Invoke `operation` with exponential backoff, sleeping on the Tokio timer.
///
/// # Examples
///
/// ```
/// use fetch_retry::{RetryPolicy, Retryable, fetch_with_retry};
///
/// #[derive(Debug)]
/// struct Flaky;
///
/// impl Retryable for Flaky {
///     fn is_retryable(&self) -> bool {
///         true
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let result: Result<u32, Flaky> =
///     fetch_with_retry(|| async { Ok(7) }, RetryPolicy::default()).await;
/// assert_eq!(result.ok(), Some(7));
/// # }
/// ```
///
/// # Errors
///
/// Returns the last error once retries are exhausted, or the first error
/// that is not retryable.
pub async fn fetch_with_retry<T, E, F, Fut>(operation: F, policy: RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable,
{
    fetch_with_retry_using(operation, policy, &TokioSleeper).await
}

/// Invoke `operation` with exponential backoff using an explicit sleeper.
///
/// With `policy.retries = n`, an operation that always fails with a
/// retryable error runs `n + 1` times.
///
/// # Errors
///
/// Returns the last error once retries are exhausted, or the first error
/// that is not retryable.
pub async fn fetch_with_retry_using<T, E, F, Fut>(
    mut operation: F,
    policy: RetryPolicy,
    sleeper: &dyn Sleeper,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable,
{
    let mut retries_left = policy.retries;
    let mut delay = policy.initial_delay;
    let mut attempt: u32 = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if retries_left > 0 && error.is_retryable() => {
                tracing::debug!(
                    attempt,
                    retries_left,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "attempt failed; backing off before retry"
                );
                sleeper.sleep(delay).await;
                delay = delay.saturating_mul(2);
                retries_left = retries_left.saturating_sub(1);
                attempt = attempt.saturating_add(1);
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for retry counting and backoff growth.

    use super::*;
    use rstest::{fixture, rstest};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum FakeError {
        Transient,
        Permission,
    }

    impl Retryable for FakeError {
        fn is_retryable(&self) -> bool {
            matches!(self, Self::Transient)
        }
    }

    #[derive(Default)]
    struct RecordingSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        fn delays(&self) -> Vec<Duration> {
            self.delays.lock().expect("delays mutex").clone()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.delays.lock().expect("delays mutex").push(duration);
        }
    }

    #[fixture]
    fn sleeper() -> RecordingSleeper {
        RecordingSleeper::default()
    }

    fn policy(retries: u32) -> RetryPolicy {
        RetryPolicy::new(retries, Duration::from_millis(100))
    }

    #[test]
    fn default_policy_matches_documented_budget() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.retries, 3);
        assert_eq!(policy.initial_delay, Duration::from_millis(1_000));
    }

    #[rstest]
    #[tokio::test]
    async fn succeeds_after_two_transient_failures(sleeper: RecordingSleeper) {
        let calls = AtomicU32::new(0);
        let result = fetch_with_retry_using(
            || {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if call <= 2 {
                        Err(FakeError::Transient)
                    } else {
                        Ok("done")
                    }
                }
            },
            policy(3),
            &sleeper,
        )
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn permission_errors_are_never_retried(sleeper: RecordingSleeper) {
        let calls = AtomicU32::new(0);
        let result: Result<(), FakeError> = fetch_with_retry_using(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(FakeError::Permission) }
            },
            policy(3),
            &sleeper,
        )
        .await;

        assert_eq!(result, Err(FakeError::Permission));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[rstest]
    #[case::no_retries(0, 1)]
    #[case::one_retry(1, 2)]
    #[case::three_retries(3, 4)]
    #[tokio::test]
    async fn exhausted_budget_propagates_last_error(
        sleeper: RecordingSleeper,
        #[case] retries: u32,
        #[case] expected_calls: u32,
    ) {
        let calls = AtomicU32::new(0);
        let result: Result<(), FakeError> = fetch_with_retry_using(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(FakeError::Transient) }
            },
            policy(retries),
            &sleeper,
        )
        .await;

        assert_eq!(result, Err(FakeError::Transient));
        assert_eq!(calls.load(Ordering::SeqCst), expected_calls);
        assert_eq!(sleeper.delays().len(), retries as usize);
    }

    #[rstest]
    #[tokio::test]
    async fn delays_double_after_each_retry(sleeper: RecordingSleeper) {
        let _result: Result<(), FakeError> =
            fetch_with_retry_using(|| async { Err(FakeError::Transient) }, policy(3), &sleeper)
                .await;

        assert_eq!(
            sleeper.delays(),
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_sleeper_waits_for_the_backoff() {
        let started = tokio::time::Instant::now();
        let calls = AtomicU32::new(0);
        let result = fetch_with_retry(
            || {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if call == 1 {
                        Err(FakeError::Transient)
                    } else {
                        Ok(call)
                    }
                }
            },
            RetryPolicy::default(),
        )
        .await;

        assert_eq!(result, Ok(2));
        assert!(started.elapsed() >= Duration::from_millis(1_000));
    }
}
