// ===========================
// tests/unit/token_tests.rs
// ===========================
//! Scope separation and expiry of `TokenService`
use crate::test_utils::{test_clock, TEST_SECRET};
use backend_lib::auth::token::VERIFICATION_TOKEN_TTL;
use backend_lib::auth::{TokenScope, TokenService};
use backend_lib::error::TokenError;
use std::time::Duration;

fn service() -> (TokenService, std::sync::Arc<backend_lib::testing::MutableClock>) {
    let clock = test_clock();
    let tokens =
        TokenService::new(TEST_SECRET.as_bytes(), Duration::from_secs(15 * 60), clock.clone())
            .unwrap();
    (tokens, clock)
}

#[test]
fn test_subject_round_trips_for_each_scope() {
    let (tokens, _clock) = service();
    for subject in ["ann@example.com", "o'brien+tag@example.co.uk"] {
        for scope in [TokenScope::Session, TokenScope::EmailVerify] {
            let token = tokens.issue(subject, scope).unwrap();
            assert_eq!(tokens.verify(&token, scope).unwrap(), subject);
        }
    }
}

#[test]
fn test_cross_scope_replay_is_rejected() {
    let (tokens, _clock) = service();
    let verify = tokens.issue("ann@example.com", TokenScope::EmailVerify).unwrap();
    assert_eq!(
        tokens.verify(&verify, TokenScope::Session),
        Err(TokenError::ScopeMismatch)
    );
}

#[test]
fn test_expiry_is_checked_before_scope() {
    let (tokens, clock) = service();
    let session = tokens.issue("ann@example.com", TokenScope::Session).unwrap();
    clock.advance(Duration::from_secs(16 * 60));
    assert_eq!(
        tokens.verify(&session, TokenScope::EmailVerify),
        Err(TokenError::Expired)
    );
}

#[test]
fn test_verification_lifetime_is_one_hour() {
    let (tokens, clock) = service();
    assert_eq!(tokens.lifetime(TokenScope::EmailVerify), VERIFICATION_TOKEN_TTL);
    let token = tokens.issue("ann@example.com", TokenScope::EmailVerify).unwrap();

    clock.advance(VERIFICATION_TOKEN_TTL);
    assert!(tokens.verify(&token, TokenScope::EmailVerify).is_ok());
    clock.advance_seconds(1);
    assert_eq!(
        tokens.verify(&token, TokenScope::EmailVerify),
        Err(TokenError::Expired)
    );
}

#[test]
fn test_tampered_signature_is_rejected() {
    let (tokens, _clock) = service();
    let token = tokens.issue("ann@example.com", TokenScope::Session).unwrap();
    let (unsigned, signature) = token.rsplit_once('.').unwrap();
    let flipped = if signature.starts_with('A') { "B" } else { "A" };
    let tampered = format!("{unsigned}.{flipped}{}", &signature[1..]);
    assert_eq!(
        tokens.verify(&tampered, TokenScope::Session),
        Err(TokenError::InvalidSignature)
    );
}
