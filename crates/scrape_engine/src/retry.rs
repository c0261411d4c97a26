//! Retry policy for transient fetch failures.
//!
//! Delays double from `base_delay`: with the defaults a request that keeps
//! failing waits 1s, 2s and 4s before giving up after four requests in total.

use std::time::Duration;

use reqwest::Method;

use crate::FailureKind;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
const RETRYABLE_STATUSES: [u16; 4] = [500, 502, 503, 504];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first request; 0 disables retrying.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn no_retries() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Only idempotent, body-less methods are replayed.
    pub fn allows_method(&self, method: &Method) -> bool {
        *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS
    }

    pub fn is_retryable(&self, kind: FailureKind) -> bool {
        match kind {
            FailureKind::Timeout | FailureKind::ConnectionError => true,
            FailureKind::HttpStatus(code) => RETRYABLE_STATUSES.contains(&code),
            FailureKind::Other => false,
        }
    }

    /// Delay before retry number `retry` (1-based), or `None` once retries
    /// are exhausted.
    pub fn delay_before(&self, retry: u32) -> Option<Duration> {
        if retry == 0 || retry > self.max_retries {
            return None;
        }
        let factor = 2u32.saturating_pow(retry - 1);
        Some(self.base_delay.saturating_mul(factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_delays_double_from_one_second() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_before(1), Some(Duration::from_secs(1)));
        assert_eq!(policy.delay_before(2), Some(Duration::from_secs(2)));
        assert_eq!(policy.delay_before(3), Some(Duration::from_secs(4)));
        assert_eq!(policy.delay_before(4), None);
    }

    #[test]
    fn only_gateway_and_server_errors_retry() {
        let policy = RetryPolicy::default();
        for code in [500, 502, 503, 504] {
            assert!(policy.is_retryable(FailureKind::HttpStatus(code)));
        }
        assert!(!policy.is_retryable(FailureKind::HttpStatus(404)));
        assert!(!policy.is_retryable(FailureKind::HttpStatus(501)));
        assert!(policy.is_retryable(FailureKind::ConnectionError));
        assert!(policy.is_retryable(FailureKind::Timeout));
        assert!(!policy.is_retryable(FailureKind::Other));
    }

    #[test]
    fn only_idempotent_methods_retry() {
        let policy = RetryPolicy::default();
        assert!(policy.allows_method(&Method::GET));
        assert!(policy.allows_method(&Method::HEAD));
        assert!(policy.allows_method(&Method::OPTIONS));
        assert!(!policy.allows_method(&Method::POST));
    }

    #[test]
    fn zero_retries_never_waits() {
        assert_eq!(RetryPolicy::no_retries().delay_before(1), None);
    }
}
