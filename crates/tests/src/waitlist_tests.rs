use crate::fixtures::{seed::waitlist_body, test_app::TestApp};
use serde_json::Value;

#[tokio::test]
async fn signup_normalizes_and_starts_pending() {
    let app = TestApp::spawn().await;

    let entry = app
        .apply("Meera", "Meera@Test.com", "+91 98000-11111")
        .await;
    assert_eq!(entry["status"], "pending");
    assert_eq!(entry["email"], "meera@test.com");
    assert_eq!(entry["phone"], "+919800011111");
    assert!(entry["ambassador_id"].is_null());
}

#[tokio::test]
async fn duplicate_email_or_phone_is_a_conflict() {
    let app = TestApp::spawn().await;
    app.apply("Meera", "meera@test.com", "+919800011111").await;

    for body in [
        waitlist_body("Other", "meera@test.com", "+919800022222"),
        waitlist_body("Other", "other@test.com", "+91 98000 11111"),
    ] {
        let resp = app
            .client
            .post(app.url("/api/waitlist"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 409);
    }
}

#[tokio::test]
async fn invalid_phone_is_rejected() {
    let app = TestApp::spawn().await;
    let resp = app
        .client
        .post(app.url("/api/waitlist"))
        .json(&waitlist_body("Meera", "meera@test.com", "12-34"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn approve_creates_ambassador_once() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin").await;
    let ambassador = app.seed_ambassador(&admin, "+919800033333").await;

    assert_eq!(ambassador.referral_code.len(), 8);
    assert!(ambassador
        .referral_code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));

    // Terminal: neither a second approval nor a rejection is allowed.
    for action in ["approve", "reject"] {
        let resp = app
            .auth_post(
                &format!("/api/admin/waitlist/{}/{}", ambassador.waitlist_id, action),
                &admin.access_token,
            )
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 409, "{action} after approve");
    }

    let resp = app
        .auth_get("/api/admin/waitlist?status=approved", &admin.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["total"], 1);
    assert_eq!(json["items"][0]["ambassador_id"], ambassador.id.as_str());
}

#[tokio::test]
async fn reject_records_note_and_filters() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin").await;
    let entry = app.apply("Kiran", "kiran@test.com", "+919800044444").await;
    app.apply("Lata", "lata@test.com", "+919800055555").await;

    let resp = app
        .auth_post(
            &format!("/api/admin/waitlist/{}/reject", entry["id"].as_str().unwrap()),
            &admin.access_token,
        )
        .json(&serde_json::json!({ "note": "Outside service area" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "rejected");
    assert_eq!(json["review_note"], "Outside service area");

    let resp = app
        .auth_get("/api/admin/waitlist?status=pending", &admin.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["total"], 1);
    assert_eq!(json["items"][0]["name"], "Lata");
}

#[tokio::test]
async fn unknown_application_is_not_found() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin").await;

    let resp = app
        .auth_post(
            &format!("/api/admin/waitlist/{}/approve", bson::oid::ObjectId::new().to_hex()),
            &admin.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    let resp = app
        .auth_post("/api/admin/waitlist/not-an-id/approve", &admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn failed_approval_reopens_the_application() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin").await;
    let entry = app
        .apply("Meera", "meera@test.com", "+919800044444")
        .await;
    let id = entry["id"].as_str().unwrap();

    // An existing ambassador already holds the phone number.
    let squatter = app
        .db
        .collection::<bson::Document>("ambassadors")
        .insert_one(bson::doc! {
            "phone": "+919800044444",
            "email": "squatter@test.com",
            "referral_code": "SQUAT001",
        })
        .await
        .unwrap();

    let resp = app
        .auth_post(&format!("/api/admin/waitlist/{}/approve", id), &admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);

    let resp = app
        .auth_get("/api/admin/waitlist?status=pending", &admin.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    let pending = json["items"].as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["id"], id);
    assert!(pending[0]["ambassador_id"].is_null());
    assert!(pending[0]["reviewed_at"].is_null());

    app.db
        .collection::<bson::Document>("ambassadors")
        .delete_one(bson::doc! { "_id": squatter.inserted_id })
        .await
        .unwrap();

    let resp = app
        .auth_post(&format!("/api/admin/waitlist/{}/approve", id), &admin.access_token)
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["application"]["status"], "approved");
    assert!(json["referral_code"].as_str().is_some());
}
