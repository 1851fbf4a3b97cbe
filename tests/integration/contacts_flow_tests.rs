//! End-to-end contact management through the HTTP router
use crate::test_utils::{empty_request, json_request, setup_test_env};
use axum::http::StatusCode;
use serde_json::{json, Value};

fn kim() -> Value {
    json!({
        "first_name": "Kim",
        "last_name": "Philby",
        "email": "kimf@mail.co.uk",
        "phone_number": "012223456789",
        "birthday": "1985-05-06",
        "additional_data": "test-02"
    })
}

fn born(first_name: &str, birthday: &str) -> Value {
    json!({
        "first_name": first_name,
        "last_name": "Doe",
        "email": format!("{}@example.com", first_name.to_lowercase()),
        "birthday": birthday
    })
}

#[tokio::test]
async fn test_contacts_require_a_session() {
    let env = setup_test_env();
    let (status, body) = env.send(empty_request("GET", "/contacts", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_002");
}

#[tokio::test]
async fn test_contact_crud() {
    let env = setup_test_env();
    let session = env.signed_in("ann@example.com").await;

    let (status, created) = env
        .send(json_request("POST", "/contacts", Some(&session), &kim()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_u64().unwrap();
    assert_eq!(created["birthday"], "1985-05-06");

    let (status, fetched) = env
        .send(empty_request("GET", &format!("/contacts/{id}"), Some(&session)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = env
        .send(json_request(
            "PUT",
            &format!("/contacts/{id}"),
            Some(&session),
            &json!({ "phone_number": "01222", "additional_data": "test-211(PUT)" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["phone_number"], "01222");
    assert_eq!(updated["first_name"], "Kim");

    let (status, list) = env
        .send(empty_request("GET", "/contacts?skip=0&limit=10", Some(&session)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, found) = env
        .send(empty_request("GET", "/contacts/search?query=PHIL", Some(&session)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found[0]["id"], id);

    let (status, body) = env
        .send(empty_request("DELETE", &format!("/contacts/{id}"), Some(&session)))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = env
        .send(empty_request("GET", &format!("/contacts/{id}"), Some(&session)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NF_001");
}

#[tokio::test]
async fn test_invalid_contact_is_rejected() {
    let env = setup_test_env();
    let session = env.signed_in("ann@example.com").await;

    let mut body = kim();
    body["email"] = json!("not-an-email");
    let (status, body) = env
        .send(json_request("POST", "/contacts", Some(&session), &body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_001");
}

#[tokio::test]
async fn test_contacts_are_private_to_their_owner() {
    let env = setup_test_env();
    let ann = env.signed_in("ann@example.com").await;
    let bob = env.signed_in("bob@example.com").await;

    let (_, created) = env
        .send(json_request("POST", "/contacts", Some(&ann), &kim()))
        .await;
    let id = created["id"].as_u64().unwrap();

    let (status, _) = env
        .send(empty_request("GET", &format!("/contacts/{id}"), Some(&bob)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = env
        .send(empty_request("DELETE", &format!("/contacts/{id}"), Some(&bob)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = env.send(empty_request("GET", "/contacts", Some(&bob))).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_upcoming_birthdays() {
    let env = setup_test_env();
    let session = env.signed_in("ann@example.com").await;

    for (name, birthday) in [
        ("Jan", "1991-01-02"),
        ("Dec", "1975-12-20"),
        ("Late", "2001-12-29"),
        ("June", "1990-06-03"),
    ] {
        let (status, _) = env
            .send(json_request("POST", "/contacts", Some(&session), &born(name, birthday)))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // The test clock reads 2024-12-28
    let (status, body) = env
        .send(empty_request("GET", "/contacts/birthdays", Some(&session)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "message": "Jan Doe's birthday is on JAN-02 (ID: 1)" },
            { "message": "Late Doe's birthday is on DEC-29 (ID: 3)" }
        ])
    );

    let (status, body) = env
        .send(empty_request(
            "GET",
            "/contacts/birthdays?days=5&start_date=2024-06-01",
            Some(&session),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["message"], "June Doe's birthday is on JUN-03 (ID: 4)");

    let (status, body) = env
        .send(empty_request("GET", "/contacts/birthdays?days=0", Some(&session)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BDAY_001");
}
