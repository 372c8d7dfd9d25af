//! Retry policy tests.

use std::time::Duration;

use meridian_net::{NetworkConfig, NetworkError, RetryPolicy};

fn http_error(status: u16) -> NetworkError {
    NetworkError::HttpStatus {
        status,
        message: String::new(),
    }
}

#[test]
fn test_default_policy() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_retries, 3);
    assert_eq!(policy.base_delay, Duration::from_millis(1000));
    assert_eq!(policy.backoff_multiplier, 2.0);
}

#[test]
fn test_retryable_error_classes() {
    let policy = RetryPolicy::default();

    assert!(policy.should_retry(0, &NetworkError::NetworkUnavailable));
    assert!(policy.should_retry(0, &NetworkError::Timeout("timed out".into())));
    assert!(policy.should_retry(0, &http_error(500)));
    assert!(policy.should_retry(0, &http_error(502)));
    assert!(policy.should_retry(0, &http_error(503)));
    assert!(policy.should_retry(0, &http_error(504)));
}

#[test]
fn test_client_errors_never_retried() {
    let policy = RetryPolicy::default();

    assert!(!policy.should_retry(0, &http_error(400)));
    assert!(!policy.should_retry(0, &http_error(401)));
    assert!(!policy.should_retry(0, &http_error(404)));
    assert!(!policy.should_retry(0, &http_error(422)));
}

#[test]
fn test_non_transport_errors_never_retried() {
    let policy = RetryPolicy::default();

    assert!(!policy.should_retry(0, &NetworkError::Serialization("bad json".into())));
    assert!(!policy.should_retry(0, &NetworkError::Unknown("boom".into())));
}

#[test]
fn test_attempt_budget_exhaustion() {
    let policy = RetryPolicy::new(2, Duration::from_millis(10));

    assert!(policy.should_retry(0, &NetworkError::NetworkUnavailable));
    assert!(policy.should_retry(1, &NetworkError::NetworkUnavailable));
    assert!(!policy.should_retry(2, &NetworkError::NetworkUnavailable));
    assert!(!policy.should_retry(3, &NetworkError::NetworkUnavailable));
}

#[test]
fn test_exponential_backoff_series() {
    let policy = RetryPolicy::new(3, Duration::from_millis(1000));

    assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
    assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
    assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
}

#[test]
fn test_custom_backoff_multiplier() {
    let policy = RetryPolicy::new(3, Duration::from_millis(100)).backoff_multiplier(3.0);

    assert_eq!(policy.delay_for(0), Duration::from_millis(100));
    assert_eq!(policy.delay_for(1), Duration::from_millis(300));
    assert_eq!(policy.delay_for(2), Duration::from_millis(900));
}

#[test]
fn test_custom_retryable_statuses() {
    let policy = RetryPolicy::default().retryable_statuses([429, 503]);

    assert!(policy.should_retry(0, &http_error(429)));
    assert!(policy.should_retry(0, &http_error(503)));
    assert!(!policy.should_retry(0, &http_error(500)));
}

#[test]
fn test_from_config() {
    let config = NetworkConfig::new("https://api.example.com")
        .retry_attempts(5)
        .retry_delay(Duration::from_millis(250));
    let policy = RetryPolicy::from_config(&config);

    assert_eq!(policy.max_retries, 5);
    assert_eq!(policy.base_delay, Duration::from_millis(250));
}
