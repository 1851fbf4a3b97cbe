//! End-to-end account flows through the HTTP router
use crate::test_utils::{empty_request, json_request, setup_test_env, TEST_PASSWORD};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_register_verify_login_flow() {
    let env = setup_test_env();

    let (status, body) = env.register("ann@example.com").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "ann@example.com");
    assert_eq!(body["is_verified"], false);
    assert!(body.get("password_hash").is_none());

    let (status, body) = env.register("ann@example.com").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "USER_001");

    let (status, body) = env.login("ann@example.com", TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    let session = body["access_token"].as_str().unwrap().to_string();

    // A session token cannot confirm an email
    let (status, body) = env
        .send(empty_request("GET", &format!("/users/verify?token={session}"), None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "TOKEN_003");

    let verify = env.mailer.last_token_for("ann@example.com").unwrap();
    let (status, body) = env
        .send(empty_request("GET", &format!("/users/verify?token={verify}"), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Email verified successfully");

    let (status, body) = env
        .send(empty_request("GET", &format!("/users/verify?token={verify}"), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Email already verified");

    // The cached identity reflects the confirmation
    let (status, body) = env.send(empty_request("GET", "/users/me", Some(&session))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_verified"], true);
}

#[tokio::test]
async fn test_registration_rejects_weak_input() {
    let env = setup_test_env();
    for body in [
        json!({ "email": "not-an-email", "password": TEST_PASSWORD }),
        json!({ "email": "ann@example.com", "password": "short" }),
    ] {
        let (status, body) = env
            .send(json_request("POST", "/users/register", None, &body))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VAL_001");
    }
}

#[tokio::test]
async fn test_login_with_bad_credentials() {
    let env = setup_test_env();
    env.register("ann@example.com").await;

    let (status, body) = env.login("ann@example.com", "wrong-pass-1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_001");

    let (status, _) = env.login("bob@example.com", TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_requires_a_valid_session() {
    let env = setup_test_env();

    let response = tower::ServiceExt::oneshot(
        env.app.clone(),
        empty_request("GET", "/users/me", None),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["www-authenticate"], "Bearer");

    let (status, body) = env
        .send(empty_request("GET", "/users/me", Some("garbage")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "TOKEN_004");

    let session = env.signed_in("ann@example.com").await;
    env.clock.advance_seconds(15 * 60 + 1);
    let (status, body) = env.send(empty_request("GET", "/users/me", Some(&session))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "TOKEN_002");
}

#[tokio::test]
async fn test_me_is_rate_limited() {
    let env = setup_test_env();
    let session = env.signed_in("ann@example.com").await;

    for _ in 0..5 {
        let (status, _) = env.send(empty_request("GET", "/users/me", Some(&session))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = env.send(empty_request("GET", "/users/me", Some(&session))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "RATE_001");

    env.clock.advance_seconds(60);
    let (status, _) = env.send(empty_request("GET", "/users/me", Some(&session))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_email() {
    let env = setup_test_env();

    let (status, _) = env
        .send(json_request(
            "POST",
            "/users/request_email",
            None,
            &json!({ "email": "nobody@example.com" }),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    env.register("ann@example.com").await;
    let (status, body) = env
        .send(json_request(
            "POST",
            "/users/request_email",
            None,
            &json!({ "email": "ann@example.com" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Verification email sent successfully");
    assert_eq!(env.mailer.sent_count(), 2);

    let token = env.mailer.last_token_for("ann@example.com").unwrap();
    env.send(empty_request("GET", &format!("/users/verify?token={token}"), None))
        .await;
    let (status, body) = env
        .send(json_request(
            "POST",
            "/users/request_email",
            None,
            &json!({ "email": "ann@example.com" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "USER_002");
}

#[tokio::test]
async fn test_update_avatar() {
    let env = setup_test_env();
    let session = env.signed_in("ann@example.com").await;

    let (status, body) = env
        .send(json_request(
            "POST",
            "/users/me/avatar",
            Some(&session),
            &json!({ "avatar_url": "https://cdn.example.com/ann.png" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["avatar_url"], "https://cdn.example.com/ann.png");

    let (_, body) = env.send(empty_request("GET", "/users/me", Some(&session))).await;
    assert_eq!(body["avatar_url"], "https://cdn.example.com/ann.png");
    assert_eq!(
        env.state.identity_cache.len(),
        1,
        "identity repopulated after invalidation"
    );
}

#[tokio::test]
async fn test_health_endpoints() {
    let env = setup_test_env();
    let (status, body) = env.send(empty_request("GET", "/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to the Contacts API v2.0");

    let (status, _) = env.send(empty_request("GET", "/healthz", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(env.temp_dir.path().exists());
}
