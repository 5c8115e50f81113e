use std::sync::Arc;
use std::time::Duration;

use groupframe_render::{
    CanvasRenderer, FlowConfig, HttpOrderSource, HttpPhotoLoader, NoFaceDetection, RenderFlow,
};
use serde_json::Value;

use crate::fixtures::{
    seed::{SeededAdmin, members, order_body},
    test_app::TestApp,
};

/// Four members, all photographed; m2 and m3 vote for m1.
fn voted_order() -> Value {
    let mut members = members(4, 4);
    members[1]["vote"] = Value::String("m1".to_string());
    members[2]["vote"] = Value::String("m1".to_string());
    members[3]["vote"] = Value::String("m2".to_string());
    order_body(members, None)
}

async fn render_token(app: &TestApp, admin: &SeededAdmin, order_id: &str) -> Value {
    let resp = app
        .auth_post(
            &format!("/api/admin/order/{}/render-token", order_id),
            &admin.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn render_order_requires_a_token_scoped_to_the_order() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin").await;
    let order = app.place_order(&voted_order()).await;
    let other = app.place_order(&voted_order()).await;
    let id = order["id"].as_str().unwrap();

    let issued = render_token(&app, &admin, id).await;
    let token = issued["token"].as_str().unwrap();
    assert_eq!(issued["expires_in"], 900);
    assert!(issued["url"].as_str().unwrap().contains(&format!("/render/order/{}?token=", id)));

    let resp = reqwest::get(issued["url"].as_str().unwrap()).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let payload: Value = resp.json().await.unwrap();
    assert_eq!(payload["id"], id);
    assert_eq!(payload["grid_template"], "square");
    assert_eq!(payload["members"].as_array().unwrap().len(), 4);
    assert_eq!(payload["settings"]["width"], 2550);
    assert_eq!(payload["settings"]["height"], 3300);

    // Same token, different order.
    let resp = reqwest::get(app.url(&format!(
        "/api/render/order/{}?token={}",
        other["id"].as_str().unwrap(),
        token
    )))
    .await
    .unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    let resp = reqwest::get(app.url(&format!("/api/render/order/{}", id)))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    // Admin sessions may read any order.
    let resp = app
        .auth_get(&format!("/api/render/order/{}", id), &admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn variants_list_one_per_photographed_member_with_votes() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin").await;
    let order = app.place_order(&voted_order()).await;

    let resp = app
        .auth_get(
            &format!("/api/admin/order/{}/variants", order["id"].as_str().unwrap()),
            &admin.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let listing: Value = resp.json().await.unwrap();

    assert_eq!(listing["template"], "square");
    assert_eq!(listing["grid"]["cols"], 2);
    assert_eq!(listing["grid"]["center_index"], 2);
    let variants = listing["variants"].as_array().unwrap();
    assert_eq!(variants.len(), 4);
    assert_eq!(variants[0]["id"], "variant-m1");
    assert_eq!(variants[0]["votes"], 2);
    assert_eq!(variants[1]["votes"], 1);
    assert_eq!(variants[2]["votes"], 0);
}

#[tokio::test]
async fn ineligible_order_has_no_variants() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin").await;
    let order = app.place_order(&order_body(members(5, 1), None)).await;

    let resp = app
        .auth_get(
            &format!("/api/admin/order/{}/variants", order["id"].as_str().unwrap()),
            &admin.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn http_flow_bootstraps_with_a_render_token() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin").await;
    let order = app.place_order(&voted_order()).await;
    let id = order["id"].as_str().unwrap();
    let issued = render_token(&app, &admin, id).await;

    let renderer = CanvasRenderer::new(
        Arc::new(HttpPhotoLoader::new(Duration::from_secs(5)).unwrap()),
        Arc::new(NoFaceDetection),
        1600,
    );
    let flow = RenderFlow::new(
        Arc::new(HttpOrderSource::new(app.settings.render.api_base.clone()).unwrap()),
        Arc::new(renderer),
        FlowConfig::from_settings(&app.settings.render),
    );

    let listing = flow
        .bootstrap(id, issued["token"].as_str())
        .await
        .unwrap();
    assert_eq!(listing.order_id, id);
    assert_eq!(listing.variants.len(), 4);

    let err = flow.bootstrap(id, Some("not-a-token")).await.unwrap_err();
    assert!(err.to_string().contains("401"));
}

/// Polls until the task leaves pending/processing.
async fn wait_for_task(app: &TestApp, admin: &SeededAdmin, task_id: &str) -> Value {
    for _ in 0..600 {
        let task: Value = app
            .auth_get(&format!("/api/admin/task/{}", task_id), &admin.access_token)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if task["status"] == "completed" || task["status"] == "failed" {
            return task;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    panic!("Task {task_id} did not finish");
}

#[tokio::test]
async fn background_render_writes_a_png() {
    let app = TestApp::spawn_with_settings(|s| s.render.render_timeout_secs = 300).await;
    let admin = app.register_admin("admin").await;
    let order = app.place_order(&voted_order()).await;

    let resp = app
        .auth_post(
            &format!("/api/admin/order/{}/render", order["id"].as_str().unwrap()),
            &admin.access_token,
        )
        .json(&serde_json::json!({ "variant_id": "variant-m1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 202);
    let task: Value = resp.json().await.unwrap();
    assert_eq!(task["category"], "render");
    let task_id = task["id"].as_str().unwrap().to_string();

    let task = wait_for_task(&app, &admin, &task_id).await;
    assert_eq!(task["status"], "completed", "task failed: {}", task["error"]);
    assert_eq!(task["progress"], 100);
    assert_eq!(
        task["file_name"],
        format!("{}-variant-m1.png", order["order_number"].as_str().unwrap())
    );

    let resp = app
        .auth_get(
            &format!("/api/admin/task/{}/download", task_id),
            &admin.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.headers()["content-type"], "image/png");
    let png = resp.bytes().await.unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (2550, 3300));
}

#[tokio::test]
async fn background_render_of_unknown_variant_fails() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin").await;
    let order = app.place_order(&voted_order()).await;

    let task: Value = app
        .auth_post(
            &format!("/api/admin/order/{}/render", order["id"].as_str().unwrap()),
            &admin.access_token,
        )
        .json(&serde_json::json!({ "variant_id": "variant-nobody" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let task = wait_for_task(&app, &admin, task["id"].as_str().unwrap()).await;
    assert_eq!(task["status"], "failed");
    assert!(task["error"].as_str().unwrap().contains("variant-nobody"));

    let resp = app
        .auth_get(
            &format!("/api/admin/task/{}/download", task["id"].as_str().unwrap()),
            &admin.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
}
