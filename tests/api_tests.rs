mod common;

use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

// ── Health ──────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
    let app = common::spawn_app().await;

    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get("x-content-type-options")
            .and_then(|v| v.to_str().ok()),
        Some("nosniff")
    );
    assert_eq!(resp.text().await.unwrap(), "ok");

    common::cleanup(app).await;
}

// ── Enqueue ─────────────────────────────────────────────────────

#[tokio::test]
async fn enqueue_accepts_and_returns_pending_id() {
    let app = common::spawn_app().await;

    let (body, status) = app
        .enqueue("addProduct", json!({ "name": "Widget", "price": 10.0 }))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["kind"], "addProduct");
    assert_eq!(body["status"], "pending");

    let id = body["id"].as_str().unwrap();
    let (entry, status) = app.get_json(&format!("/api/v1/actions/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["status"], "pending");
    assert_eq!(entry["retry_count"], 0);
    assert_eq!(entry["payload"]["name"], "Widget");

    // Accepted, not applied.
    let (products, _) = app.get_json("/api/v1/entities/products").await;
    assert_eq!(products.as_array().unwrap().len(), 0);

    common::cleanup(app).await;
}

#[tokio::test]
async fn enqueue_records_actor() {
    let app = common::spawn_app().await;

    let (body, status) = app
        .post_json(
            "/api/v1/actions",
            &json!({
                "kind": "addSetting",
                "payload": { "key": "store_name", "value": "Corner Shop" },
                "actor_id": "cashier-7"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (entry, _) = app
        .get_json(&format!("/api/v1/actions/{}", body["id"].as_str().unwrap()))
        .await;
    assert_eq!(entry["actor_id"], "cashier-7");
    assert_eq!(entry["session_id"], "test-session");

    common::cleanup(app).await;
}

#[tokio::test]
async fn enqueue_rejects_unknown_kind() {
    let app = common::spawn_app().await;

    let (body, status) = app.enqueue("addCoupon", json!({ "code": "SAVE10" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Unknown action kind"));

    let (status_body, _) = app.get_json("/api/v1/queue/status").await;
    assert_eq!(status_body["pending"], 0);

    common::cleanup(app).await;
}

#[tokio::test]
async fn enqueue_rejects_malformed_payload() {
    let app = common::spawn_app().await;

    let (body, status) = app.enqueue("addProduct", json!({ "price": "ten" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("addProduct"));

    common::cleanup(app).await;
}

// ── Queue ───────────────────────────────────────────────────────

#[tokio::test]
async fn flush_applies_queued_actions() {
    let app = common::spawn_app().await;

    let (body, _) = app
        .enqueue("addProduct", json!({ "name": "Widget", "price": 10.0, "stock": 5 }))
        .await;
    let id = body["id"].as_str().unwrap().to_string();

    let report = app.flush().await;
    assert_eq!(report["attempted"], 1);
    assert_eq!(report["completed"], 1);
    assert_eq!(report["skipped"], false);

    let (entry, _) = app.get_json(&format!("/api/v1/actions/{id}")).await;
    assert_eq!(entry["status"], "completed");
    let product_id = entry["entity_id"].as_str().unwrap();

    let (product, status) = app
        .get_json(&format!("/api/v1/entities/products/{product_id}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["name"], "Widget");
    assert_eq!(product["stock"], 5);

    let (status_body, _) = app.get_json("/api/v1/queue/status").await;
    assert_eq!(status_body, json!({ "pending": 0, "in_progress": 0, "completed": 1, "failed": 0 }));

    common::cleanup(app).await;
}

#[tokio::test]
async fn list_actions_filters_by_status() {
    let app = common::spawn_app().await;

    app.enqueue("addCustomer", json!({ "name": "Ada" })).await;
    app.flush().await;
    app.enqueue("addCustomer", json!({ "name": "Grace" })).await;

    let (all, status) = app.get_json("/api/v1/actions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (pending, _) = app.get_json("/api/v1/actions?status=pending").await;
    let pending = pending.as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["payload"]["name"], "Grace");

    let (completed, _) = app.get_json("/api/v1/actions?status=completed").await;
    assert_eq!(completed.as_array().unwrap().len(), 1);

    common::cleanup(app).await;
}

#[tokio::test]
async fn replay_and_clear_report_counts() {
    let app = common::spawn_app().await;

    let missing = Uuid::now_v7();
    app.enqueue("deleteProduct", json!({ "id": missing })).await;
    for _ in 0..3 {
        app.flush().await;
    }

    let (status_body, _) = app.get_json("/api/v1/queue/status").await;
    assert_eq!(status_body["failed"], 1);

    let (failed, _) = app.get_json("/api/v1/actions?status=failed").await;
    assert!(
        failed[0]["last_error"]
            .as_str()
            .unwrap()
            .contains(&missing.to_string())
    );

    let (body, status) = app.post_empty("/api/v1/queue/replay").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["replayed"], 1);

    let (body, _) = app.post_empty("/api/v1/queue/replay").await;
    assert_eq!(body["replayed"], 0);

    // Nothing completed is old enough to prune.
    let (body, status) = app.post_empty("/api/v1/queue/clear").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cleared"], 0);

    common::cleanup(app).await;
}

#[tokio::test]
async fn get_unknown_action_returns_404() {
    let app = common::spawn_app().await;

    let (_, status) = app
        .get_json(&format!("/api/v1/actions/{}", Uuid::now_v7()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

// ── Dequeue ─────────────────────────────────────────────────────

#[tokio::test]
async fn dequeue_pending_action() {
    let app = common::spawn_app().await;

    let (body, _) = app.enqueue("addProduct", json!({ "name": "Oops", "price": 1.0 })).await;
    let id = body["id"].as_str().unwrap().to_string();

    let (body, status) = app.delete(&format!("/api/v1/actions/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dequeued"], true);

    let report = app.flush().await;
    assert_eq!(report["attempted"], 0);

    let (_, status) = app.delete(&format!("/api/v1/actions/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

#[tokio::test]
async fn dequeue_completed_action_conflicts() {
    let app = common::spawn_app().await;

    let (body, _) = app.enqueue("addProduct", json!({ "name": "Kept", "price": 1.0 })).await;
    let id = body["id"].as_str().unwrap().to_string();
    app.flush().await;

    let (body, status) = app.delete(&format!("/api/v1/actions/{id}")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("completed"));

    common::cleanup(app).await;
}

// ── Entities ────────────────────────────────────────────────────

#[tokio::test]
async fn settings_are_read_by_key() {
    let app = common::spawn_app().await;

    app.enqueue("addSetting", json!({ "key": "tax_rate", "value": 0.2 })).await;
    app.flush().await;

    let (setting, status) = app.get_json("/api/v1/entities/settings/tax_rate").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(setting["key"], "tax_rate");
    assert_eq!(setting["value"], 0.2);

    let (_, status) = app.get_json("/api/v1/entities/settings/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

#[tokio::test]
async fn users_never_expose_password_hash() {
    let app = common::spawn_app().await;

    app.enqueue(
        "addUser",
        json!({
            "username": "ada",
            "display_name": "Ada",
            "role": "manager",
            "password_hash": "$argon2id$v=19$stub"
        }),
    )
    .await;
    app.flush().await;

    let (users, status) = app.get_json("/api/v1/entities/users").await;
    assert_eq!(status, StatusCode::OK);
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "ada");
    assert!(users[0].get("password_hash").is_none());

    common::cleanup(app).await;
}

#[tokio::test]
async fn unknown_entity_kind_returns_404() {
    let app = common::spawn_app().await;

    let (_, status) = app.get_json("/api/v1/entities/coupons").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, status) = app.get_json("/api/v1/entities/products/not-a-uuid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}
