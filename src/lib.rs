pub mod actions;
pub mod config;
pub mod db;
pub mod error;
pub mod facade;
pub mod models;
pub mod queue;
pub mod routes;
pub mod state;
pub mod worker;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::Config;
use crate::facade::PosClient;
use crate::queue::QueueManager;
use crate::state::{AppState, SharedState};

/// Open (creating if needed) the SQLite store behind `database_url`.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(10));

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Wire the queue, the facade, and the HTTP surface around one store.
/// The scheduler is not started here; see [`worker::spawn`].
pub fn build_app(pool: SqlitePool, config: Config) -> (Router, SharedState) {
    let session_id = config
        .session_id
        .unwrap_or_else(|| Uuid::now_v7().to_string());
    tracing::info!("Queue session {session_id}");

    let queue = Arc::new(QueueManager::new(pool, config.queue, session_id));
    let client = PosClient::new(queue.clone());

    let state: SharedState = Arc::new(AppState { queue, client });

    let app = Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (app, state)
}

async fn health() -> &'static str {
    "ok"
}
