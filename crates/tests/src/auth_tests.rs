use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn register_creates_admin_and_returns_tokens() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "email": "Alice@Test.com",
            "username": "alice",
            "display_name": "Alice",
            "password": "Password123!",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 201);
    assert!(resp.headers().get("set-cookie").is_some());

    let json: Value = resp.json().await.unwrap();
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["user"]["email"], "alice@test.com");
    assert_eq!(json["user"]["username"], "alice");
}

#[tokio::test]
async fn register_rejects_invalid_payload() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "email": "not-an-email",
            "username": "al",
            "display_name": "Al",
            "password": "short",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 422);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "validation");
}

#[tokio::test]
async fn register_duplicate_email_fails() {
    let app = TestApp::spawn().await;
    app.register_admin("dup").await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "email": "dup@test.com",
            "username": "other",
            "display_name": "Other",
            "password": "Password123!",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
async fn login_accepts_email_or_username() {
    let app = TestApp::spawn().await;
    app.register_admin("bob").await;

    for login in ["bob@test.com", "bob"] {
        let resp = app
            .client
            .post(app.url("/api/auth/login"))
            .json(&serde_json::json!({ "login": login, "password": "Password123!" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200, "login with {login}");
    }

    let resp = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&serde_json::json!({ "email": "bob@test.com", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn me_accepts_bearer_and_cookie() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("carol").await;

    let resp = app
        .auth_get("/api/auth/me", &admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["id"], admin.id.as_str());

    // The register call left the access cookie in the client's jar.
    let resp = app.client.get(app.url("/api/auth/me")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    app.client
        .post(app.url("/api/auth/logout"))
        .send()
        .await
        .unwrap();
    let resp = app.client.get(app.url("/api/auth/me")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn refresh_issues_new_pair_and_rejects_access_tokens() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("dave").await;

    let resp = app
        .client
        .post(app.url("/api/auth/refresh"))
        .json(&serde_json::json!({ "refresh_token": admin.refresh_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert!(json["access_token"].is_string());

    let resp = app
        .client
        .post(app.url("/api/auth/refresh"))
        .json(&serde_json::json!({ "refresh_token": admin.access_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn admin_routes_require_a_token() {
    let app = TestApp::spawn().await;

    let resp = reqwest::get(app.url("/api/admin/dashboard")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    let resp = reqwest::get(app.url("/api/health")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}
