use std::path::{Path, PathBuf};
use std::sync::Arc;

use blogforge_server::AppState;

use crate::context;

/// `blogforge serve` — run the admin API on top of the same store.
pub async fn run(db: &Path, config_path: Option<&PathBuf>, port: u16) -> anyhow::Result<()> {
    let store = context::open_store(db)?;
    let config = context::load_config(config_path)?;
    let pipeline = context::build_pipeline(store.clone(), config, false)?;
    let state = AppState::new(store, Arc::new(pipeline));
    blogforge_server::serve(state, port).await
}
