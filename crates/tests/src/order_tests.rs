use serde_json::Value;

use crate::fixtures::{
    seed::{members, order_body},
    test_app::TestApp,
};

#[tokio::test]
async fn order_is_priced_in_paise() {
    let app = TestApp::spawn().await;

    let order = app.place_order(&order_body(members(10, 2), None)).await;
    assert_eq!(order["status"], "new");
    assert_eq!(order["payment"]["status"], "pending");
    assert_eq!(order["pricing"]["member_count"], 10);
    assert_eq!(order["pricing"]["subtotal_paise"], 74900);
    assert_eq!(order["pricing"]["gst_paise"], 13482);
    assert_eq!(order["pricing"]["total_paise"], 88382);
    assert_eq!(order["customer"]["phone"], "+919800000001");
    assert_eq!(order["shipping_address"]["country"], "IN");
    assert!(order["order_number"].as_str().unwrap().starts_with("GF-"));
    assert!(order["referral_code"].is_null());
}

#[tokio::test]
async fn unknown_referral_code_is_rejected() {
    let app = TestApp::spawn().await;
    let resp = app
        .client
        .post(app.url("/api/order"))
        .json(&order_body(members(4, 0), Some("NOPE1234")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
    let json: Value = resp.json().await.unwrap();
    assert!(json["message"].as_str().unwrap().contains("Unknown referral code"));
}

#[tokio::test]
async fn malformed_referral_code_is_rejected() {
    let app = TestApp::spawn().await;
    for code in ["GF-12", "ABCD12345", "AB12 D34"] {
        let resp = app
            .client
            .post(app.url("/api/order"))
            .json(&order_body(members(4, 0), Some(code)))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 422, "{code}");
        let json: Value = resp.json().await.unwrap();
        assert!(json["message"].as_str().unwrap().contains("Malformed"), "{code}");
    }
}

#[tokio::test]
async fn invalid_members_are_rejected() {
    let app = TestApp::spawn().await;

    let mut dup = members(3, 0);
    dup[1]["id"] = Value::String("m1".to_string());
    let mut bad_vote = members(3, 0);
    bad_vote[0]["vote"] = Value::String("m99".to_string());

    for body in [
        order_body(dup, None),
        order_body(bad_vote, None),
        order_body(Vec::new(), None),
    ] {
        let resp = app
            .client
            .post(app.url("/api/order"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 422);
    }
}

#[tokio::test]
async fn eligibility_reports_photo_counts_and_grid() {
    let app = TestApp::spawn().await;

    let order = app.place_order(&order_body(members(10, 1), None)).await;
    let resp = app
        .client
        .get(app.url(&format!(
            "/api/order/{}/eligibility",
            order["id"].as_str().unwrap()
        )))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["eligible"], false);
    assert_eq!(json["member_count"], 10);
    assert_eq!(json["photographed_members"], 1);
    assert_eq!(json["grid"]["cols"], 4);
    assert_eq!(json["grid"]["rows"], 4);
    assert!(json["reason"].is_string());

    let order = app.place_order(&order_body(members(4, 4), None)).await;
    let json: Value = app
        .client
        .get(app.url(&format!(
            "/api/order/{}/eligibility",
            order["id"].as_str().unwrap()
        )))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["eligible"], true);
    assert_eq!(json["grid"]["center_index"], 2);
}

#[tokio::test]
async fn admin_lifecycle_status_payment_delete() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin").await;
    let order = app.place_order(&order_body(members(5, 0), None)).await;
    let id = order["id"].as_str().unwrap();

    let resp = app
        .auth_put(&format!("/api/admin/order/{}/status", id), &admin.access_token)
        .json(&serde_json::json!({ "status": "in_progress" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "in_progress");

    let resp = app
        .auth_put(&format!("/api/admin/order/{}/payment", id), &admin.access_token)
        .json(&serde_json::json!({ "status": "paid", "method": "upi", "reference": "UPI-1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["payment"]["status"], "paid");
    assert_eq!(json["payment"]["amount_paise"], json["pricing"]["total_paise"]);
    assert!(json["payment"]["paid_at"].is_string());

    let resp = app
        .auth_get("/api/admin/order?status=in_progress", &admin.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["total"], 1);

    let resp = app
        .auth_delete(&format!("/api/admin/order/{}", id), &admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_get(&format!("/api/admin/order/{}", id), &admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn invoice_is_a_pdf() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin").await;
    let order = app.place_order(&order_body(members(3, 0), None)).await;

    let resp = app
        .auth_get(
            &format!("/api/admin/order/{}/invoice", order["id"].as_str().unwrap()),
            &admin.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.headers()["content-type"], "application/pdf");
    let disposition = resp.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.contains(&format!("INV-{}", order["order_number"].as_str().unwrap())));

    let bytes = resp.bytes().await.unwrap();
    assert!(bytes.starts_with(b"%PDF-1."));
    assert!(bytes.ends_with(b"%%EOF\n") || bytes.ends_with(b"%%EOF"));
}
