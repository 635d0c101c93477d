use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use blogforge_core::types::{Keyword, KeywordIntent};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/keywords — queue contents, highest priority first.
pub async fn list_keywords(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let result = tokio::task::spawn_blocking(move || {
        let keywords = store.list_keywords()?;
        Ok::<_, blogforge_core::BlogError>(serde_json::to_value(keywords)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct CreateKeyword {
    pub text: String,
    pub intent: KeywordIntent,
    #[serde(default)]
    pub priority: i32,
}

/// POST /api/keywords — add a keyword to the queue.
pub async fn create_keyword(
    State(app): State<AppState>,
    Json(body): Json<CreateKeyword>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if body.text.trim().is_empty() {
        return Err(AppError::bad_request("keyword text must not be empty"));
    }

    let store = app.store.clone();
    let keyword = tokio::task::spawn_blocking(move || {
        let keyword = Keyword::new(body.text.trim(), body.intent, body.priority);
        store.insert_keyword(&keyword)?;
        Ok::<_, blogforge_core::BlogError>(keyword)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok((StatusCode::CREATED, Json(serde_json::to_value(keyword)?)))
}
