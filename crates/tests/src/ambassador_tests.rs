use bson::doc;
use groupframe_services::otp::hash_code;
use serde_json::Value;

use crate::fixtures::{
    seed::{members, order_body},
    test_app::TestApp,
};

const CODE: &str = "424242";

/// Requests a code, then pins its hash to `CODE` since the real one only
/// goes out by SMS.
async fn request_known_code(app: &TestApp, phone: &str) {
    let resp = app
        .client
        .post(app.url("/api/ambassador/otp/request"))
        .json(&serde_json::json!({ "phone": phone }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["sent"], true);
    assert_eq!(json["expires_in"], 300);

    app.db
        .collection::<bson::Document>("otp_codes")
        .update_many(
            doc! { "phone": phone, "consumed": false },
            doc! { "$set": { "code_hash": hash_code(phone, CODE) } },
        )
        .await
        .unwrap();
}

async fn verify(app: &TestApp, phone: &str, code: &str) -> reqwest::Response {
    app.client
        .post(app.url("/api/ambassador/otp/verify"))
        .json(&serde_json::json!({ "phone": phone, "code": code }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn otp_for_unknown_phone_is_not_found() {
    let app = TestApp::spawn().await;
    let resp = app
        .client
        .post(app.url("/api/ambassador/otp/request"))
        .json(&serde_json::json!({ "phone": "+919811111111" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn otp_login_then_profile_and_rewards() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin").await;
    let ambassador = app.seed_ambassador(&admin, "+919800066666").await;

    request_known_code(&app, &ambassador.phone).await;
    assert_eq!(verify(&app, &ambassador.phone, "000000").await.status().as_u16(), 401);

    let resp = verify(&app, &ambassador.phone, CODE).await;
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    let token = json["access_token"].as_str().unwrap().to_string();
    assert_eq!(json["ambassador"]["referral_code"], ambassador.referral_code.as_str());

    // A code only works once.
    assert_eq!(verify(&app, &ambassador.phone, CODE).await.status().as_u16(), 401);

    app.place_order(&order_body(members(10, 0), Some(&ambassador.referral_code)))
        .await;

    let resp = app.auth_get("/api/ambassador/me", &token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let profile: Value = resp.json().await.unwrap();
    assert_eq!(profile["id"], ambassador.id.as_str());
    assert_eq!(profile["total_referrals"], 1);
    assert_eq!(profile["rewards"]["pending_count"], 1);
    assert_eq!(profile["rewards"]["pending_paise"], 8838);

    let resp = app
        .auth_get("/api/ambassador/rewards", &token)
        .send()
        .await
        .unwrap();
    let rewards: Value = resp.json().await.unwrap();
    assert_eq!(rewards["total"], 1);
    assert_eq!(rewards["items"][0]["amount_paise"], 8838);
    assert_eq!(rewards["items"][0]["status"], "pending");
}

#[tokio::test]
async fn otp_is_burned_after_max_attempts() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin").await;
    let ambassador = app.seed_ambassador(&admin, "+919800077777").await;

    request_known_code(&app, &ambassador.phone).await;
    for _ in 0..5 {
        let status = verify(&app, &ambassador.phone, "111111").await.status().as_u16();
        assert!(matches!(status, 401 | 429));
    }
    assert_ne!(verify(&app, &ambassador.phone, CODE).await.status().as_u16(), 200);
}

#[tokio::test]
async fn ambassador_and_admin_tokens_do_not_mix() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin").await;

    let resp = app
        .auth_get("/api/ambassador/me", &admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}
