mod common;

use chrono::Duration;
use common::{spawn_app, PASSWORD};
use serde_json::{json, Value};

// --- Registration ---

#[tokio::test]
async fn register_returns_201_without_password_hash() {
    let app = spawn_app();

    let body = app.create_user("walt@breakingbad.com").await;

    assert_eq!(body["email"], "walt@breakingbad.com");
    assert_eq!(body["is_chirpy_red"], false);
    assert!(body.get("id").is_some());
    assert!(body.get("hashed_password").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let app = spawn_app();
    app.create_user("walt@breakingbad.com").await;

    let response = app
        .client
        .post(app.url("/api/users"))
        .json(&json!({ "email": "walt@breakingbad.com", "password": PASSWORD }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(409, response.status().as_u16());
}

#[tokio::test]
async fn register_rejects_invalid_input() {
    let app = spawn_app();

    for body in [
        json!({ "email": "not-an-email", "password": PASSWORD }),
        json!({ "email": "walt@breakingbad.com", "password": "short" }),
    ] {
        let response = app
            .client
            .post(app.url("/api/users"))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(400, response.status().as_u16(), "accepted {}", body);
    }
}

// --- Login ---

#[tokio::test]
async fn login_returns_both_tokens() {
    let app = spawn_app();
    app.create_user("saul@bettercall.com").await;

    let response = app.login("saul@bettercall.com", PASSWORD).await;
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], "saul@bettercall.com");
    assert_eq!(body["token"].as_str().unwrap().split('.').count(), 3);
    assert_eq!(body["refresh_token"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn wrong_password_and_unknown_user_are_indistinguishable() {
    let app = spawn_app();
    app.create_user("saul@bettercall.com").await;

    let wrong_password = app.login("saul@bettercall.com", "wrong-password").await;
    let unknown_user = app.login("nobody@bettercall.com", PASSWORD).await;

    assert_eq!(401, wrong_password.status().as_u16());
    assert_eq!(401, unknown_user.status().as_u16());

    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_user.json().await.unwrap();
    assert_eq!(a["code"], b["code"]);
    assert_eq!(a["message"], b["message"]);
}

#[tokio::test]
async fn requested_ttl_is_honoured_and_clamped() {
    let app = spawn_app();
    app.create_user("jesse@breakingbad.com").await;

    let login = |ttl: i64| {
        app.client
            .post(app.url("/api/login"))
            .json(&json!({
                "email": "jesse@breakingbad.com",
                "password": PASSWORD,
                "expires_in_seconds": ttl,
            }))
            .send()
    };

    // Short-lived token dies after its own ttl
    let body: Value = login(60).await.unwrap().json().await.unwrap();
    let short = body["token"].as_str().unwrap().to_string();

    // Out-of-range request falls back to one hour
    let body: Value = login(999_999).await.unwrap().json().await.unwrap();
    let clamped = body["token"].as_str().unwrap().to_string();

    app.clock.advance(Duration::seconds(61));

    let update = |token: String| {
        app.client
            .put(app.url("/api/users"))
            .bearer_auth(token)
            .json(&json!({ "email": "jesse@breakingbad.com", "password": PASSWORD }))
            .send()
    };
    assert_eq!(401, update(short).await.unwrap().status().as_u16());
    assert_eq!(200, update(clamped.clone()).await.unwrap().status().as_u16());

    app.clock.advance(Duration::seconds(3600));
    assert_eq!(401, update(clamped).await.unwrap().status().as_u16());
}

// --- Protected resources ---

#[tokio::test]
async fn update_user_requires_a_bearer_token() {
    let app = spawn_app();

    let response = app
        .client
        .put(app.url("/api/users"))
        .json(&json!({ "email": "a@b.com", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());

    let response = app
        .client
        .put(app.url("/api/users"))
        .bearer_auth("not.a.jwt")
        .json(&json!({ "email": "a@b.com", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn update_user_changes_credentials() {
    let app = spawn_app();
    let (token, _, id) = app.signed_in_user("walt@breakingbad.com").await;

    let response = app
        .client
        .put(app.url("/api/users"))
        .bearer_auth(&token)
        .json(&json!({ "email": "heisenberg@breakingbad.com", "password": "blue-sky-99" }))
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], id);
    assert_eq!(body["email"], "heisenberg@breakingbad.com");

    assert_eq!(401, app.login("walt@breakingbad.com", PASSWORD).await.status().as_u16());
    assert_eq!(
        200,
        app.login("heisenberg@breakingbad.com", "blue-sky-99").await.status().as_u16()
    );
}

// --- Refresh and revoke ---

#[tokio::test]
async fn refresh_issues_a_new_access_token() {
    let app = spawn_app();
    let (_, refresh_token, _) = app.signed_in_user("walt@breakingbad.com").await;

    let response = app
        .client
        .post(app.url("/api/refresh"))
        .bearer_auth(&refresh_token)
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    let token = body["token"].as_str().unwrap();

    let response = app
        .client
        .post(app.url("/api/chirps"))
        .bearer_auth(token)
        .json(&json!({ "body": "refreshed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(201, response.status().as_u16());
}

#[tokio::test]
async fn access_token_is_not_a_refresh_token() {
    let app = spawn_app();
    let (access_token, _, _) = app.signed_in_user("walt@breakingbad.com").await;

    let response = app
        .client
        .post(app.url("/api/refresh"))
        .bearer_auth(&access_token)
        .send()
        .await
        .unwrap();

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn revoked_refresh_token_cannot_be_used() {
    let app = spawn_app();
    let (_, refresh_token, _) = app.signed_in_user("walt@breakingbad.com").await;

    let response = app
        .client
        .post(app.url("/api/revoke"))
        .bearer_auth(&refresh_token)
        .send()
        .await
        .unwrap();
    assert_eq!(204, response.status().as_u16());

    let response = app
        .client
        .post(app.url("/api/refresh"))
        .bearer_auth(&refresh_token)
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());

    // Revoking again is a no-op
    let response = app
        .client
        .post(app.url("/api/revoke"))
        .bearer_auth(&refresh_token)
        .send()
        .await
        .unwrap();
    assert_eq!(204, response.status().as_u16());
}

#[tokio::test]
async fn refresh_token_expires_after_sixty_days() {
    let app = spawn_app();
    let (_, refresh_token, _) = app.signed_in_user("walt@breakingbad.com").await;

    app.clock.advance(Duration::days(59));
    let response = app
        .client
        .post(app.url("/api/refresh"))
        .bearer_auth(&refresh_token)
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());

    app.clock.advance(Duration::days(1));
    let response = app
        .client
        .post(app.url("/api/refresh"))
        .bearer_auth(&refresh_token)
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn refresh_without_credential_is_rejected() {
    let app = spawn_app();

    let response = app.client.post(app.url("/api/refresh")).send().await.unwrap();

    assert_eq!(401, response.status().as_u16());
}
