pub mod actions;
pub mod entities;
pub mod queue;

use axum::Router;
use axum::routing::{get, post};

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Actions
        .route("/api/v1/actions", get(actions::list).post(actions::enqueue))
        .route(
            "/api/v1/actions/{id}",
            get(actions::get).delete(actions::dequeue),
        )
        // Queue
        .route("/api/v1/queue/status", get(queue::status))
        .route("/api/v1/queue/replay", post(queue::replay))
        .route("/api/v1/queue/clear", post(queue::clear))
        .route("/api/v1/queue/flush", post(queue::flush))
        // Entities (read-only, served from the store)
        .route("/api/v1/entities/{kind}", get(entities::list))
        .route("/api/v1/entities/{kind}/{key}", get(entities::get))
}
