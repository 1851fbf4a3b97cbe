// ==============================
// tests/unit/rate_gate_tests.rs
// ==============================
//! This test suite is designed to validate the fixed-window `RateGate`
use crate::test_utils::test_clock;
use backend_lib::auth::RateGate;
use backend_lib::error::AppError;
use std::time::Duration;

const WINDOW: Duration = Duration::from_secs(60);

#[test]
fn test_rate_gate_allows_initial_requests() {
    let gate = RateGate::new(test_clock());
    assert!(gate.allow("127.0.0.1", 5, WINDOW));
}

#[test]
fn test_rate_gate_blocks_after_limit() {
    let gate = RateGate::new(test_clock());
    for _ in 0..5 {
        assert!(gate.allow("127.0.0.2", 5, WINDOW));
    }
    assert!(!gate.allow("127.0.0.2", 5, WINDOW));
    assert!(matches!(
        gate.check("127.0.0.2", 5, WINDOW),
        Err(AppError::Throttled)
    ));
}

#[test]
fn test_rate_gate_resets_after_window() {
    let clock = test_clock();
    let gate = RateGate::new(clock.clone());
    for _ in 0..6 {
        gate.allow("127.0.0.3", 5, WINDOW);
    }

    clock.advance(WINDOW);
    for _ in 0..5 {
        assert!(gate.allow("127.0.0.3", 5, WINDOW));
    }
    assert!(!gate.allow("127.0.0.3", 5, WINDOW));
}

#[test]
fn test_rate_gate_cleanup() {
    let clock = test_clock();
    let gate = RateGate::new(clock.clone());
    for i in 0..10 {
        gate.allow(&format!("10.0.0.{i}"), 5, WINDOW);
    }
    assert_eq!(gate.tracked_keys(), 10);

    assert_eq!(gate.purge_expired(), 0);
    clock.advance(WINDOW);
    assert_eq!(gate.purge_expired(), 10);
    assert_eq!(gate.tracked_keys(), 0);
}
