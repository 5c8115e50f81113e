use serde_json::Value;

use crate::fixtures::{
    seed::{members, order_body},
    test_app::TestApp,
};

#[tokio::test]
async fn paying_a_reward_credits_the_ambassador_once() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin").await;
    let ambassador = app.seed_ambassador(&admin, "+919800088888").await;

    let order = app
        .place_order(&order_body(members(10, 0), Some(&ambassador.referral_code.to_lowercase())))
        .await;
    assert_eq!(order["referral_code"], ambassador.referral_code.as_str());
    assert_eq!(order["ambassador_id"], ambassador.id.as_str());

    let resp = app
        .auth_get("/api/admin/reward?status=pending", &admin.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["total"], 1);
    let reward_id = json["items"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(json["items"][0]["order_number"], order["order_number"]);

    let resp = app
        .auth_post(&format!("/api/admin/reward/{}/pay", reward_id), &admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "paid");
    assert!(json["paid_at"].is_string());

    let resp = app
        .auth_post(&format!("/api/admin/reward/{}/pay", reward_id), &admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);

    let ambassador_row = app
        .db
        .collection::<bson::Document>("ambassadors")
        .find_one(bson::doc! { "referral_code": &ambassador.referral_code })
        .await
        .unwrap()
        .unwrap();
    let earned = ambassador_row
        .get("total_earned_paise")
        .and_then(|v| v.as_i64().or_else(|| v.as_i32().map(i64::from)));
    assert_eq!(earned, Some(8838));
}

#[tokio::test]
async fn deleting_an_order_cancels_its_pending_reward() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin").await;
    let ambassador = app.seed_ambassador(&admin, "+919800099999").await;

    let order = app
        .place_order(&order_body(members(4, 0), Some(&ambassador.referral_code)))
        .await;

    let resp = app
        .auth_delete(
            &format!("/api/admin/order/{}", order["id"].as_str().unwrap()),
            &admin.access_token,
        )
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["cancelled_rewards"], 1);

    let resp = app
        .auth_get(
            &format!("/api/admin/reward?ambassador_id={}", ambassador.id),
            &admin.access_token,
        )
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["total"], 1);
    assert_eq!(json["items"][0]["status"], "cancelled");
}
