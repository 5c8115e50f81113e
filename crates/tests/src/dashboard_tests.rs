use serde_json::Value;

use crate::fixtures::{
    seed::{members, order_body},
    test_app::TestApp,
};

#[tokio::test]
async fn dashboard_aggregates_orders_waitlist_and_rewards() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin").await;
    let ambassador = app.seed_ambassador(&admin, "+919800012345").await;
    app.apply("Pending Person", "pending@test.com", "+919800054321")
        .await;

    let paid = app
        .place_order(&order_body(members(10, 0), Some(&ambassador.referral_code)))
        .await;
    app.place_order(&order_body(members(3, 0), None)).await;

    let resp = app
        .auth_put(
            &format!("/api/admin/order/{}/payment", paid["id"].as_str().unwrap()),
            &admin.access_token,
        )
        .json(&serde_json::json!({ "status": "paid" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_get("/api/admin/dashboard", &admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let stats: Value = resp.json().await.unwrap();

    assert_eq!(stats["orders"]["total"], 2);
    assert_eq!(stats["orders"]["new"], 2);
    assert_eq!(stats["orders"]["paid_revenue_paise"], 88382);
    assert_eq!(stats["waitlist"]["pending"], 1);
    assert_eq!(stats["waitlist"]["approved"], 1);
    assert_eq!(stats["active_ambassadors"], 1);
    assert_eq!(stats["rewards"]["pending_count"], 1);
    assert_eq!(stats["rewards"]["pending_paise"], 8838);
}
