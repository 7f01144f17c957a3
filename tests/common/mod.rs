#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tempfile::TempDir;

use tillqueue::config::{Config, QueueConfig};
use tillqueue::facade::PosClient;
use tillqueue::queue::QueueManager;
use tillqueue::state::SharedState;

/// Queue tuning for tests: fast triggers, no periodic passes getting in the way.
pub fn queue_config() -> QueueConfig {
    QueueConfig {
        max_retries: 3,
        retention: Duration::from_secs(24 * 60 * 60),
        debounce: Duration::from_millis(10),
        poll_interval: Duration::from_secs(3600),
        prune_interval: Duration::from_secs(3600),
        handler_timeout: Some(Duration::from_secs(5)),
    }
}

/// A migrated store in its own temporary directory.
pub struct TestStore {
    pub pool: SqlitePool,
    pub database_url: String,
    // Dropped last: removes the database file.
    _dir: TempDir,
}

pub async fn open_store() -> TestStore {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let database_url = format!("sqlite://{}", dir.path().join("pos.db").display());

    let pool = tillqueue::connect(&database_url)
        .await
        .expect("Failed to open test store");
    tillqueue::migrate(&pool)
        .await
        .expect("Failed to run migrations on test store");

    TestStore {
        pool,
        database_url,
        _dir: dir,
    }
}

/// A queue manager and facade over a fresh store. No scheduler runs; tests
/// drive passes by hand.
pub struct TestQueue {
    pub store: TestStore,
    pub queue: Arc<QueueManager>,
    pub client: PosClient,
}

impl TestQueue {
    pub fn pool(&self) -> &SqlitePool {
        &self.store.pool
    }
}

pub async fn spawn_queue() -> TestQueue {
    spawn_queue_with(queue_config()).await
}

pub async fn spawn_queue_with(config: QueueConfig) -> TestQueue {
    let store = open_store().await;
    let queue = Arc::new(QueueManager::new(
        store.pool.clone(),
        config,
        "test-session",
    ));
    let client = PosClient::new(queue.clone());
    TestQueue {
        store,
        queue,
        client,
    }
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("count query failed")
}

/// A running HTTP server over a fresh store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub state: SharedState,
    pub client: Client,
    pub store: TestStore,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.store.pool
    }

    /// POST an action, return (body, status).
    pub async fn enqueue(&self, kind: &str, payload: Value) -> (Value, StatusCode) {
        self.post_json("/api/v1/actions", &json!({ "kind": kind, "payload": payload }))
            .await
    }

    pub async fn get_json(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post_empty(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn delete(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Run a pass through the API and return its report.
    pub async fn flush(&self) -> Value {
        let (body, status) = self.post_empty("/api/v1/queue/flush").await;
        assert_eq!(status, StatusCode::OK, "flush failed: {body}");
        body
    }
}

/// Spawn a test app on a random port. No scheduler runs; use `flush`.
pub async fn spawn_app() -> TestApp {
    let store = open_store().await;

    let config = Config {
        database_url: store.database_url.clone(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        log_level: "warn".to_string(),
        session_id: Some("test-session".to_string()),
        queue: queue_config(),
    };

    let (app, state) = tillqueue::build_app(store.pool.clone(), config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        state,
        client: Client::new(),
        store,
    }
}

pub async fn cleanup(app: TestApp) {
    app.store.pool.close().await;
}
