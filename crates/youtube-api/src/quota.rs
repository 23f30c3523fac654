//! Error classification for YouTube Data API failures
//!
//! Distinguishes quota exhaustion (403 with a quota reason in the error
//! envelope) from rate limiting (403 with a rate-limit reason, retryable)
//! and from every other forbidden-class failure (fatal). Only a quota
//! reason evicts a key; a bare 403 never does.

use quota_pool::ErrorClass;

use crate::error::ApiError;

/// Reasons in a 403 envelope that mean the key's quota is spent.
const QUOTA_REASONS: &[&str] = &["quotaExceeded", "dailyLimitExceeded"];

/// Reasons in a 403 envelope that mean a per-second/per-user rate limit,
/// expected to pass on retry with the same key.
const RATE_LIMIT_REASONS: &[&str] = &["rateLimitExceeded", "userRateLimitExceeded"];

/// Classify a Data API failure for the retry engine.
///
/// - QuotaExceeded: 403 whose reason list names quota exhaustion
/// - Transient: network failures; 403 with a rate-limit reason; timeout,
///   rate-limited and server-error statuses (408, 429, 5xx)
/// - Fatal: everything else, propagated unmodified
pub fn classify(err: &ApiError) -> ErrorClass {
    match err {
        ApiError::Network(_) => ErrorClass::Transient,
        ApiError::Api {
            status: 403,
            reasons,
            ..
        } => {
            if reasons.iter().any(|r| QUOTA_REASONS.contains(&r.as_str())) {
                ErrorClass::QuotaExceeded
            } else if reasons
                .iter()
                .any(|r| RATE_LIMIT_REASONS.contains(&r.as_str()))
            {
                ErrorClass::Transient
            } else {
                ErrorClass::Fatal
            }
        }
        ApiError::Api {
            status: 408 | 429 | 500 | 502 | 503 | 504,
            ..
        } => ErrorClass::Transient,
        ApiError::Api { .. } => ErrorClass::Fatal,
        ApiError::Decode { .. } => ErrorClass::Fatal,
    }
}
