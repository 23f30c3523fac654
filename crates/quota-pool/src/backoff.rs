//! Exponential backoff schedule for transient retries

use std::time::Duration;

/// Bounded backoff budget: `max_retries` additional attempts after the
/// first, with a doubling delay before each one.
///
/// Delay before retry `i` (1-based) is `base × 2^(i−1)`: with the default
/// 1-second base that is 1s, 2s, 4s, 8s, 16s, 32s. The schedule is
/// monotonically non-decreasing and uses saturating arithmetic.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub max_retries: u32,
    pub base: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            max_retries: 6,
            base: Duration::from_secs(1),
        }
    }
}

impl Backoff {
    /// Delay to sleep before retry number `retry` (1-based).
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base.saturating_mul(factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_budget_is_six_retries_from_one_second() {
        let b = Backoff::default();
        assert_eq!(b.max_retries, 6);
        let delays: Vec<u64> = (1..=6).map(|i| b.delay(i).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16, 32]);
    }

    #[test]
    fn schedule_is_non_decreasing() {
        let b = Backoff::default();
        let mut prev = Duration::ZERO;
        for i in 1..=10 {
            let d = b.delay(i);
            assert!(d >= prev, "delay must never decrease");
            prev = d;
        }
    }

    #[test]
    fn large_retry_numbers_saturate_instead_of_overflowing() {
        let b = Backoff {
            max_retries: 6,
            base: Duration::from_secs(1),
        };
        // Must not panic
        let _ = b.delay(u32::MAX);
    }
}
