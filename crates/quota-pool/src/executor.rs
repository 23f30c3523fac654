//! The quota-aware executor: execute, classify, retry
//!
//! Two explicit nested loops compose the retry policies. The outer loop
//! rotates keys on quota exhaustion with no retry limit (self-limiting,
//! since every rotation permanently evicts a key from a finite pool). The
//! inner loop retries transient failures on the same key with exponential
//! backoff up to a bounded budget. Rotation resets the inner counter, so
//! each key gets a full backoff budget.

use std::future::Future;
use std::sync::Arc;

use common::ApiKey;
use tracing::warn;

use crate::ErrorClass;
use crate::backoff::Backoff;
use crate::error::ExecuteError;
use crate::pool::KeyPool;

/// Quota-aware executor over a shared key pool.
///
/// Generic over the protocol error type `E`; the classifier maps each
/// failure onto an [`ErrorClass`] that drives the retry decision. The
/// executor is cheap to clone and safe to share across concurrent
/// requests - each `execute` call keeps its own attempt state, the pool
/// is the only shared resource.
pub struct Executor<E> {
    pool: Arc<KeyPool>,
    backoff: Backoff,
    classify: fn(&E) -> ErrorClass,
}

impl<E> Clone for Executor<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            backoff: self.backoff,
            classify: self.classify,
        }
    }
}

impl<E> Executor<E> {
    pub fn new(pool: Arc<KeyPool>, backoff: Backoff, classify: fn(&E) -> ErrorClass) -> Self {
        Self {
            pool,
            backoff,
            classify,
        }
    }

    /// The pool this executor draws keys from.
    pub fn pool(&self) -> &Arc<KeyPool> {
        &self.pool
    }

    /// Run `operation` to completion under quota rotation and transient
    /// backoff.
    ///
    /// The operation is invoked fresh for every attempt with the key to
    /// use for that attempt. Attempts within one call are strictly
    /// sequential. Cancelling (dropping) the returned future aborts the
    /// in-flight attempt or pending backoff sleep; it never evicts a key.
    ///
    /// Terminal outcomes: the successful response, or one of
    /// [`ExecuteError::NoKeysAvailable`], [`ExecuteError::QuotaExhausted`],
    /// [`ExecuteError::TransientRetriesExhausted`],
    /// [`ExecuteError::Fatal`].
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T, ExecuteError<E>>
    where
        F: FnMut(ApiKey) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        metrics::counter!("executor_requests_total").increment(1);
        let mut rotations = 0u32;

        // Outer loop: quota rotation, unbounded.
        loop {
            let Some(key) = self.pool.pick().await else {
                return Err(if rotations == 0 {
                    ExecuteError::NoKeysAvailable
                } else {
                    ExecuteError::QuotaExhausted {
                        keys: self.pool.initial_len(),
                    }
                });
            };

            // Inner loop: transient backoff, bounded per key.
            let mut attempt = 1u32;
            loop {
                let err = match operation(key.clone()).await {
                    Ok(response) => return Ok(response),
                    Err(err) => err,
                };

                match (self.classify)(&err) {
                    ErrorClass::Fatal => return Err(ExecuteError::Fatal(err)),
                    ErrorClass::QuotaExceeded => {
                        self.pool.evict(&key).await;
                        rotations += 1;
                        metrics::counter!("executor_quota_evictions_total").increment(1);
                        let remaining = self.pool.len().await;
                        warn!(
                            key = %key.fingerprint(),
                            rotations,
                            remaining,
                            "quota exceeded, rotating key"
                        );
                        break;
                    }
                    ErrorClass::Transient => {
                        if attempt > self.backoff.max_retries {
                            metrics::counter!("executor_retry_exhaustions_total").increment(1);
                            warn!(
                                key = %key.fingerprint(),
                                attempts = attempt,
                                "transient retry budget exhausted"
                            );
                            return Err(ExecuteError::TransientRetriesExhausted {
                                attempts: attempt,
                                source: err,
                            });
                        }
                        let delay = self.backoff.delay(attempt);
                        metrics::counter!("executor_transient_retries_total").increment(1);
                        warn!(
                            key = %key.fingerprint(),
                            attempt,
                            delay_secs = delay.as_secs(),
                            "transient failure, backing off"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[derive(Debug, thiserror::Error)]
    enum TestError {
        #[error("quota")]
        Quota,
        #[error("transient")]
        Transient,
        #[error("fatal")]
        Fatal,
    }

    fn classify(err: &TestError) -> ErrorClass {
        match err {
            TestError::Quota => ErrorClass::QuotaExceeded,
            TestError::Transient => ErrorClass::Transient,
            TestError::Fatal => ErrorClass::Fatal,
        }
    }

    fn pool_of(names: &[&str]) -> Arc<KeyPool> {
        Arc::new(KeyPool::new(names.iter().copied().map(ApiKey::new).collect()))
    }

    /// Fast backoff so non-paused tests don't sleep for real.
    fn quick_backoff() -> Backoff {
        Backoff {
            max_retries: 6,
            base: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn empty_pool_fails_before_any_attempt() {
        let executor = Executor::new(pool_of(&[]), Backoff::default(), classify);
        let attempts = AtomicU32::new(0);

        let result: Result<(), _> = executor
            .execute(|_key| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError::Fatal) }
            })
            .await;

        assert!(matches!(result, Err(ExecuteError::NoKeysAvailable)));
        assert_eq!(attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rotation_exhausts_all_keys_in_exactly_n_attempts() {
        let pool = pool_of(&["key-1", "key-2", "key-3"]);
        let executor = Executor::new(pool.clone(), Backoff::default(), classify);
        let seen = Mutex::new(Vec::new());

        let result: Result<(), _> = executor
            .execute(|key| {
                seen.lock().unwrap().push(key.expose().to_string());
                async { Err(TestError::Quota) }
            })
            .await;

        assert!(matches!(result, Err(ExecuteError::QuotaExhausted { keys: 3 })));
        // One attempt per key, each key tried once, never an evicted key
        let seen = seen.into_inner().unwrap();
        assert_eq!(seen, vec!["key-1", "key-2", "key-3"]);
        assert!(pool.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_budget_is_seven_attempts_with_doubling_delays() {
        let pool = pool_of(&["key-1"]);
        let executor = Executor::new(pool.clone(), Backoff::default(), classify);
        let stamps = Mutex::new(Vec::new());

        let result: Result<(), _> = executor
            .execute(|_key| {
                stamps.lock().unwrap().push(tokio::time::Instant::now());
                async { Err(TestError::Transient) }
            })
            .await;

        match result {
            Err(ExecuteError::TransientRetriesExhausted { attempts, .. }) => {
                assert_eq!(attempts, 7, "first attempt + 6 retries")
            }
            other => panic!("expected TransientRetriesExhausted, got {other:?}"),
        }

        let stamps = stamps.into_inner().unwrap();
        assert_eq!(stamps.len(), 7);
        let gaps: Vec<u64> = stamps
            .windows(2)
            .map(|w| (w[1] - w[0]).as_secs())
            .collect();
        assert_eq!(gaps, vec![1, 2, 4, 8, 16, 32]);

        // Transient exhaustion never evicts
        assert_eq!(pool.len().await, 1);
    }

    #[tokio::test]
    async fn fatal_short_circuits_without_retry_or_eviction() {
        let pool = pool_of(&["key-1", "key-2"]);
        let executor = Executor::new(pool.clone(), Backoff::default(), classify);
        let attempts = AtomicU32::new(0);

        let result: Result<(), _> = executor
            .execute(|_key| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError::Fatal) }
            })
            .await;

        assert!(matches!(result, Err(ExecuteError::Fatal(TestError::Fatal))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(pool.len().await, 2);
    }

    #[tokio::test]
    async fn success_after_rotation_keeps_surviving_key() {
        let pool = pool_of(&["key-1", "key-2"]);
        let executor = Executor::new(pool.clone(), Backoff::default(), classify);

        let result = executor
            .execute(|key| async move {
                if key.expose() == "key-1" {
                    Err(TestError::Quota)
                } else {
                    Ok("response")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "response");
        assert_eq!(pool.len().await, 1);
        assert_eq!(pool.pick().await.unwrap().expose(), "key-2");
    }

    #[tokio::test(start_paused = true)]
    async fn rotation_resets_the_backoff_budget() {
        // key-1 burns its whole transient budget minus one, then hits quota
        // on its last attempt; key-2 then needs 6 retries of its own before
        // succeeding. If the counter carried across rotation, key-2 would
        // exhaust instead of succeeding.
        let pool = pool_of(&["key-1", "key-2"]);
        let executor = Executor::new(pool.clone(), quick_backoff(), classify);
        let key1_attempts = AtomicU32::new(0);
        let key2_attempts = AtomicU32::new(0);

        let result = executor
            .execute(|key| {
                let is_first = key.expose() == "key-1";
                let n = if is_first {
                    key1_attempts.fetch_add(1, Ordering::SeqCst) + 1
                } else {
                    key2_attempts.fetch_add(1, Ordering::SeqCst) + 1
                };
                async move {
                    match (is_first, n) {
                        (true, n) if n < 7 => Err(TestError::Transient),
                        (true, _) => Err(TestError::Quota),
                        (false, n) if n < 7 => Err(TestError::Transient),
                        (false, _) => Ok("late success"),
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "late success");
        assert_eq!(key1_attempts.load(Ordering::SeqCst), 7);
        assert_eq!(key2_attempts.load(Ordering::SeqCst), 7);
        assert_eq!(pool.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_requests_share_the_pool_without_interference() {
        let pool = pool_of(&["key-1", "key-2"]);
        let executor = Executor::new(pool.clone(), Backoff::default(), classify);

        // Both tasks hit quota on key-1; eviction is idempotent, both rotate
        // to key-2 and succeed.
        let mut handles = Vec::new();
        for _ in 0..2 {
            let executor = executor.clone();
            handles.push(tokio::spawn(async move {
                executor
                    .execute(|key| async move {
                        if key.expose() == "key-1" {
                            Err(TestError::Quota)
                        } else {
                            Ok(())
                        }
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(pool.len().await, 1);
    }

    #[tokio::test]
    async fn cancellation_leaves_the_pool_intact() {
        let pool = pool_of(&["key-1"]);
        let executor = Executor::new(pool.clone(), Backoff::default(), classify);

        let handle = tokio::spawn(async move {
            executor
                .execute(|_key| async {
                    // In-flight attempt that never completes
                    std::future::pending::<Result<(), TestError>>().await
                })
                .await
        });

        tokio::task::yield_now().await;
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
        assert_eq!(pool.len().await, 1, "cancellation must not evict");
    }
}
