use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use blogforge_core::config::ConfigOverrides;
use blogforge_core::pipeline::RunRequest;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TriggerBody {
    pub keyword_id: Option<Uuid>,
    pub topic_id: Option<Uuid>,
    #[serde(default)]
    pub overrides: ConfigOverrides,
}

/// POST /api/pipeline/run — start a generation run.
///
/// The job record is created before this handler returns, so the caller can
/// poll `/api/jobs/{id}` immediately. The run itself executes on a spawned
/// task; its outcome lands on the job run, not on this response.
pub async fn trigger_run(
    State(app): State<AppState>,
    body: Option<Json<TriggerBody>>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let job = app.pipeline.prepare_job()?;

    let pipeline = app.pipeline.clone();
    let request = RunRequest {
        keyword_id: body.keyword_id,
        topic_id: body.topic_id,
        overrides: body.overrides,
    };
    let job_id = job.id;
    tokio::spawn(async move {
        let outcome = pipeline.execute_job(job_id, request).await;
        if !outcome.success {
            tracing::warn!(%job_id, errors = ?outcome.errors, "pipeline run failed");
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "job_run_id": job.id,
            "status": job.status,
        })),
    ))
}
