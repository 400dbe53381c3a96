use core_logic::{is_mempool_full, RetryConfig};
use std::time::Duration;

#[test]
fn test_defaults() {
    let config = RetryConfig::default();
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.base_delay_ms, 2000);
    assert_eq!(config.max_delay_ms, 30000);
    assert!(config.jitter);
}

#[test]
fn test_partial_override_keeps_defaults() {
    let config: RetryConfig =
        serde_json::from_str(r#"{"max_retries": 2, "jitter": false}"#).unwrap();
    assert_eq!(config.max_retries, 2);
    assert!(!config.jitter);
    assert_eq!(config.base_delay_ms, 2000);
    assert_eq!(config.delay_for(0), Duration::from_millis(2000));
    assert_eq!(config.delay_for(1), Duration::from_millis(4000));
}

#[test]
fn test_schedule_is_bounded() {
    let config = RetryConfig::default().without_jitter();
    let total: Duration = (0..config.max_retries).map(|n| config.delay_for(n)).sum();
    // 2 + 4 + 8 + 16 + 30 seconds
    assert_eq!(total, Duration::from_secs(60));
}

#[test]
fn test_zero_base_never_sleeps() {
    let config = RetryConfig::new(3, 0);
    for attempt in 0..3 {
        assert_eq!(config.delay_for(attempt), Duration::ZERO);
    }
}

#[test]
fn test_mempool_full_in_node_errors() {
    let err = anyhow::anyhow!("(code: -32000, message: mempool is full, data: None)")
        .context("Failed to submit swap");
    assert!(is_mempool_full(format!("{:#}", err)));
    assert!(!is_mempool_full("insufficient funds for gas * price + value"));
}
