use std::sync::Arc;

use blogforge_core::pipeline::Pipeline;
use blogforge_core::store::Store;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(store: Arc<Store>, pipeline: Arc<Pipeline>) -> Self {
        Self { store, pipeline }
    }
}
