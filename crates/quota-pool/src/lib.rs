//! Quota-aware request execution over a shrinking pool of API keys
//!
//! Wraps an arbitrary outbound call with key assignment, quota-exhaustion
//! detection and two composed retry policies. The caller supplies an
//! operation parameterized by "the key to use for this attempt" and an
//! error classifier; the executor does the rest.
//!
//! Request lifecycle:
//! 1. Executor picks the first remaining key from the pool
//! 2. Operation runs with that key; transient failures retry on the same
//!    key with exponential backoff (bounded budget)
//! 3. A quota-exceeded failure evicts the key permanently and rotates to
//!    the next one with a fresh backoff budget (unbounded rotations)
//! 4. Fatal failures propagate immediately, untouched
//!
//! The pool only shrinks: an evicted key is never reinserted for the life
//! of the process. A fresh run re-reads all configured keys.

pub mod backoff;
pub mod error;
pub mod executor;
pub mod pool;

pub use backoff::Backoff;
pub use error::ExecuteError;
pub use executor::Executor;
pub use pool::KeyPool;

/// Classification of a protocol error, driving the retry decision.
///
/// Produced by the protocol layer's classifier and consumed by the
/// executor via ordinary control flow:
/// - QuotaExceeded evicts the attempt's key and rotates to the next one
/// - Transient retries the same key with backoff (bounded budget)
/// - Fatal propagates to the caller with no retry and no eviction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The key used for this attempt has no remaining quota
    QuotaExceeded,
    /// Retryable on the same key (network blip, 5xx, rate limit)
    Transient,
    /// Retrying cannot fix this (malformed request, not-found, permission)
    Fatal,
}
