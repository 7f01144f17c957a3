mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use tillqueue::models::action::{NewProduct, ProductUpdate, SettingValue};
use tillqueue::models::{Action, Entity, EntityKind};
use tillqueue::queue::ActionOutcome;

fn widget() -> Action {
    Action::AddProduct(NewProduct {
        name: "Widget".to_string(),
        sku: None,
        category: Some("hardware".to_string()),
        price: 10.0,
        stock: 12,
    })
}

// ── Reads ───────────────────────────────────────────────────────

#[tokio::test]
async fn reads_do_not_see_queued_writes() {
    let t = common::spawn_queue().await;

    t.client.write(widget()).await.unwrap();
    assert!(t.client.read_all(EntityKind::Product).await.unwrap().is_empty());

    t.client.flush().await.unwrap();
    let products = t.client.read_all(EntityKind::Product).await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].kind(), EntityKind::Product);
}

#[tokio::test]
async fn read_by_key_returns_committed_entity() {
    let t = common::spawn_queue().await;

    let id = t.client.write(widget()).await.unwrap();
    t.client.flush().await.unwrap();
    let entry = t.client.entry(id).await.unwrap().unwrap();
    let key = entry.entity_id.unwrap();

    match t.client.read(EntityKind::Product, &key).await.unwrap() {
        Some(Entity::Product(product)) => {
            assert_eq!(product.id.to_string(), key);
            assert_eq!(product.category.as_deref(), Some("hardware"));
            assert_eq!(product.stock, 12);
        }
        other => panic!("expected product, got {other:?}"),
    }

    // Same key, wrong kind.
    assert!(t.client.read(EntityKind::Customer, &key).await.unwrap().is_none());
    assert!(t.client.read(EntityKind::Product, "nope").await.unwrap().is_none());
}

#[tokio::test]
async fn settings_are_keyed_by_name() {
    let t = common::spawn_queue().await;

    t.client
        .write(Action::AddSetting(SettingValue {
            key: "receipt_footer".to_string(),
            value: json!({ "text": "Thanks!", "lines": 2 }),
        }))
        .await
        .unwrap();
    t.client.flush().await.unwrap();

    match t.client.read(EntityKind::Setting, "receipt_footer").await.unwrap() {
        Some(Entity::Setting(setting)) => {
            assert_eq!(setting.value["text"], "Thanks!");
        }
        other => panic!("expected setting, got {other:?}"),
    }
}

#[tokio::test]
async fn update_keeps_fields_it_does_not_set() {
    let t = common::spawn_queue().await;

    let id = t.client.write(widget()).await.unwrap();
    t.client.flush().await.unwrap();
    let key = t.client.entry(id).await.unwrap().unwrap().entity_id.unwrap();

    t.client
        .write(Action::UpdateProduct(ProductUpdate {
            id: key.parse().unwrap(),
            name: None,
            sku: Some("W-1".to_string()),
            category: None,
            price: Some(12.5),
            stock: None,
        }))
        .await
        .unwrap();
    t.client.flush().await.unwrap();

    match t.client.read(EntityKind::Product, &key).await.unwrap() {
        Some(Entity::Product(product)) => {
            assert_eq!(product.name, "Widget");
            assert_eq!(product.sku.as_deref(), Some("W-1"));
            // Null in the payload leaves the column alone.
            assert_eq!(product.category.as_deref(), Some("hardware"));
            assert_eq!(product.price, 12.5);
            assert_eq!(product.stock, 12);
        }
        other => panic!("expected product, got {other:?}"),
    }
}

// ── Read-after-write ────────────────────────────────────────────

#[tokio::test]
async fn write_and_wait_returns_created_entity_id() {
    let t = common::spawn_queue().await;
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let scheduler = tillqueue::worker::spawn(Arc::clone(&t.queue), shutdown_rx);

    let outcome = tokio::time::timeout(Duration::from_secs(5), t.client.write_and_wait(widget()))
        .await
        .expect("write was never applied")
        .unwrap();

    let key = match outcome {
        ActionOutcome::Completed {
            entity_id: Some(key),
        } => key,
        other => panic!("expected completion, got {other:?}"),
    };
    assert!(t.client.read(EntityKind::Product, &key).await.unwrap().is_some());

    shutdown_tx.send(true).unwrap();
    scheduler.await.unwrap();
}

#[tokio::test]
async fn write_and_wait_reports_failure() {
    // Retries wait for the next periodic pass.
    let mut config = common::queue_config();
    config.poll_interval = Duration::from_millis(50);
    let t = common::spawn_queue_with(config).await;
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let scheduler = tillqueue::worker::spawn(Arc::clone(&t.queue), shutdown_rx);

    // Negative prices are rejected by the handler on every attempt.
    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        t.client.write_and_wait(Action::AddProduct(NewProduct {
            name: "Broken".to_string(),
            sku: None,
            category: None,
            price: -1.0,
            stock: 0,
        })),
    )
    .await
    .expect("write never reached a terminal state")
    .unwrap();

    match outcome {
        ActionOutcome::Failed { retry_count, .. } => assert_eq!(retry_count, 3),
        other => panic!("expected failure, got {other:?}"),
    }

    shutdown_tx.send(true).unwrap();
    scheduler.await.unwrap();
}
