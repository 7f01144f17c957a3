use std::sync::Arc;

use crate::facade::PosClient;
use crate::queue::QueueManager;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub queue: Arc<QueueManager>,
    pub client: PosClient,
}
