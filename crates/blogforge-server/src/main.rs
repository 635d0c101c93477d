use std::path::PathBuf;
use std::sync::Arc;

use blogforge_core::config::PipelineConfig;
use blogforge_core::pipeline::Pipeline;
use blogforge_core::store::Store;
use blogforge_server::AppState;
use genai_client::{HttpBackend, MockBackend};

/// Standalone server binary. `BLOGFORGE_DB` selects the database path,
/// `BLOGFORGE_CONFIG` an optional YAML config, `GENAI_BASE_URL`/`GENAI_API_KEY`
/// the backend; without a base URL the scripted mock backend is used.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let db_path = std::env::var("BLOGFORGE_DB").unwrap_or_else(|_| "blogforge.redb".into());
    let config = match std::env::var("BLOGFORGE_CONFIG") {
        Ok(path) => PipelineConfig::load(&PathBuf::from(path))?,
        Err(_) => PipelineConfig::default(),
    };
    let port: u16 = std::env::var("BLOGFORGE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3141);

    let store = Arc::new(Store::open(&PathBuf::from(db_path))?);
    let pipeline = match std::env::var("GENAI_BASE_URL") {
        Ok(base_url) => {
            let api_key = std::env::var("GENAI_API_KEY").ok();
            let backend = Arc::new(HttpBackend::new(base_url, api_key));
            Pipeline::new(
                store.clone(),
                backend.clone(),
                backend.clone(),
                backend,
                config,
            )
        }
        Err(_) => {
            tracing::warn!("GENAI_BASE_URL not set, using the scripted mock backend");
            let backend = Arc::new(MockBackend::new());
            Pipeline::new(
                store.clone(),
                backend.clone(),
                backend.clone(),
                backend,
                config,
            )
        }
    };

    let state = AppState::new(store, Arc::new(pipeline));
    blogforge_server::serve(state, port).await
}
