//! Shared wiring for commands that need the store and a pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use blogforge_core::config::PipelineConfig;
use blogforge_core::pipeline::Pipeline;
use blogforge_core::store::Store;
use genai_client::{HttpBackend, MockBackend};

pub fn open_store(db: &Path) -> anyhow::Result<Arc<Store>> {
    let store = Store::open(db).with_context(|| format!("failed to open {}", db.display()))?;
    Ok(Arc::new(store))
}

pub fn load_config(path: Option<&PathBuf>) -> anyhow::Result<PipelineConfig> {
    match path {
        Some(p) => {
            PipelineConfig::load(p).with_context(|| format!("failed to load {}", p.display()))
        }
        None => Ok(PipelineConfig::default()),
    }
}

/// Wire a pipeline against the configured backend. With `mock` set (or no
/// `GENAI_BASE_URL` in the environment) the scripted backend is used.
pub fn build_pipeline(
    store: Arc<Store>,
    config: PipelineConfig,
    mock: bool,
) -> anyhow::Result<Pipeline> {
    if !mock {
        if let Ok(base_url) = std::env::var("GENAI_BASE_URL") {
            let api_key = std::env::var("GENAI_API_KEY").ok();
            let backend = Arc::new(HttpBackend::new(base_url, api_key));
            return Ok(Pipeline::new(
                store,
                backend.clone(),
                backend.clone(),
                backend,
                config,
            ));
        }
        tracing::warn!("GENAI_BASE_URL not set, using the scripted mock backend");
    }
    let backend = Arc::new(MockBackend::new());
    Ok(Pipeline::new(
        store,
        backend.clone(),
        backend.clone(),
        backend,
        config,
    ))
}
