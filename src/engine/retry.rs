use std::time::Duration;

use tracing::warn;

use super::RadioResponse;
use crate::errors::HarnessError;

/// Bounded-retry policy for a single protocol operation. The delay is a
/// constant interval: BLE advertising and connection events are roughly
/// periodic, so backoff growth would only lengthen tests.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Default policy for scan and connection attempts.
    pub fn connection() -> Self {
        Self {
            max_attempts: 7,
            delay: Duration::from_secs(1),
        }
    }

    /// Lightweight availability probes get fewer attempts.
    pub fn probe() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Invoke a single-shot engine operation up to `policy.max_attempts` times,
/// stopping at the first attempt that is neither the error sentinel nor a
/// raised fault. A fault is logged as a failed attempt and retried; it is
/// never escalated, even when attempts exhaust.
pub fn with_retries<F>(
    operation_name: &str,
    policy: &RetryPolicy,
    mut op: F,
) -> (bool, Option<RadioResponse>)
where
    F: FnMut() -> Result<RadioResponse, HarnessError>,
{
    let mut last = None;

    for attempt in 1..=policy.max_attempts {
        match op() {
            Ok(response) if !response.is_failure() => {
                return (true, Some(response));
            }
            Ok(response) => {
                warn!(
                    operation = operation_name,
                    attempt,
                    max = policy.max_attempts,
                    "Attempt failed with error sentinel"
                );
                last = Some(response);
            }
            Err(e) => {
                warn!(
                    operation = operation_name,
                    attempt,
                    max = policy.max_attempts,
                    error = %e,
                    "Attempt raised a fault"
                );
            }
        }

        if attempt < policy.max_attempts {
            std::thread::sleep(policy.delay);
        }
    }

    warn!(
        operation = operation_name,
        attempts = policy.max_attempts,
        "All retry attempts exhausted"
    );
    (false, last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn zero_delay(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_first_attempt_success_stops_retrying() {
        let calls = Cell::new(0u32);
        let (ok, response) = with_retries("connect", &zero_delay(7), || {
            calls.set(calls.get() + 1);
            Ok(RadioResponse::Packet("LL_VERSION_IND".into()))
        });
        assert!(ok);
        assert_eq!(calls.get(), 1);
        assert_eq!(response, Some(RadioResponse::Packet("LL_VERSION_IND".into())));
    }

    #[test]
    fn test_succeeds_on_seventh_attempt_after_six_failures() {
        let calls = Cell::new(0u32);
        let (ok, response) = with_retries("connect", &zero_delay(7), || {
            calls.set(calls.get() + 1);
            if calls.get() < 7 {
                Ok(RadioResponse::ErrorSentinel)
            } else {
                Ok(RadioResponse::Packet("connected".into()))
            }
        });
        assert!(ok);
        assert_eq!(calls.get(), 7);
        assert_eq!(response, Some(RadioResponse::Packet("connected".into())));
    }

    #[test]
    fn test_all_sentinel_failures_reports_overall_failure() {
        let calls = Cell::new(0u32);
        let (ok, response) = with_retries("scan", &zero_delay(3), || {
            calls.set(calls.get() + 1);
            Ok(RadioResponse::ErrorSentinel)
        });
        assert!(!ok);
        assert_eq!(calls.get(), 3);
        assert_eq!(response, Some(RadioResponse::ErrorSentinel));
    }

    #[test]
    fn test_fault_is_retried_not_escalated() {
        let calls = Cell::new(0u32);
        let (ok, _) = with_retries("connect", &zero_delay(3), || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(HarnessError::Collaborator("serial link dropped".into()))
            } else {
                Ok(RadioResponse::Packet("connected".into()))
            }
        });
        assert!(ok);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_exhausted_faults_do_not_propagate() {
        let (ok, response) = with_retries("connect", &zero_delay(2), || {
            Err(HarnessError::Collaborator("unplugged".into()))
        });
        assert!(!ok);
        assert_eq!(response, None);
    }

    #[test]
    fn test_empty_response_counts_as_success() {
        // Empty is not the error sentinel; classifying the silence is the
        // caller's job.
        let (ok, response) = with_retries("length", &zero_delay(3), || Ok(RadioResponse::Empty));
        assert!(ok);
        assert_eq!(response, Some(RadioResponse::Empty));
    }
}
