//! Terminal error kinds surfaced by the executor
//!
//! Quota rotation and transient backoff are recovered locally and stay
//! invisible to callers; only these kinds surface.

/// Terminal outcome of an `execute` call, generic over the protocol
/// error type `E`.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError<E> {
    /// The pool was empty before any attempt (configuration-level).
    #[error("no API keys available")]
    NoKeysAvailable,

    /// Every configured key was evicted during this operation.
    #[error("quota exhausted for all {keys} configured keys")]
    QuotaExhausted { keys: usize },

    /// The bounded backoff budget was spent while errors stayed transient.
    #[error("transient retries exhausted after {attempts} attempts")]
    TransientRetriesExhausted {
        attempts: u32,
        #[source]
        source: E,
    },

    /// The original underlying cause, unmodified.
    #[error(transparent)]
    Fatal(E),
}
