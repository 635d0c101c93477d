use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/jobs — run history, newest first.
pub async fn list_jobs(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let result = tokio::task::spawn_blocking(move || {
        let runs = store.list_job_runs()?;
        let list: Vec<serde_json::Value> = runs
            .iter()
            .map(|r| {
                serde_json::json!({
                    "id": r.id,
                    "job_type": r.job_type,
                    "status": r.status,
                    "stage": r.stage,
                    "started_at": r.started_at,
                    "finished_at": r.finished_at,
                    "duration_ms": r.duration_ms,
                    "post_id": r.post_id,
                    "error": r.error,
                })
            })
            .collect();
        Ok::<_, blogforge_core::BlogError>(serde_json::json!(list))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/jobs/{id} — poller view: status, stage, full log stream.
pub async fn get_job(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let progress = tokio::task::spawn_blocking(move || store.job_progress(id))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::to_value(progress)?))
}
