//! Job-run state machine for pipeline executions.
//!
//! A `JobRun` is one execution record: status, an explicit pipeline stage,
//! and an append-only log. External callers observe progress by polling the
//! stored record — the orchestrator never pushes updates. The stage field is
//! the enumerated progress indicator; UIs map it directly to display state
//! instead of matching log-message substrings.

use chrono::{DateTime, Utc};
use genai_client::TokenUsage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BlogError, Result};

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a job run.
///
/// Transitions: `Pending → Running → Completed | Failed`, with the terminal
/// transition happening exactly once. [`JobRun::finalize`] enforces this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineStage
// ---------------------------------------------------------------------------

/// Where a running pipeline currently is. Written by the orchestrator at
/// every step boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Queued,
    ResolvingConfig,
    SelectingKeyword,
    ResolvingTopic,
    GeneratingContent,
    InsertingLinks,
    ProcessingSeo,
    GeneratingImages,
    EvaluatingQuality,
    Persisting,
    Done,
}

// ---------------------------------------------------------------------------
// Log entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

// ---------------------------------------------------------------------------
// JobRun
// ---------------------------------------------------------------------------

/// One pipeline execution record. The run exclusively owns its log — no
/// external writer appends to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRun {
    pub id: Uuid,
    /// E.g. "blog_generation".
    pub job_type: String,
    pub status: JobStatus,
    pub stage: PipelineStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<Uuid>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
}

impl JobRun {
    /// Create a run already in `Running` state — the pipeline writes the
    /// record before its first step so pollers can attach immediately.
    pub fn start(job_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_type: job_type.into(),
            status: JobStatus::Running,
            stage: PipelineStage::Queued,
            keyword_id: None,
            topic_id: None,
            post_id: None,
            started_at: Utc::now(),
            finished_at: None,
            duration_ms: None,
            logs: Vec::new(),
            error: None,
            token_usage: None,
        }
    }

    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.logs.push(LogEntry {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        });
    }

    /// Transition to a terminal status. Errors if the run is already
    /// terminal — the `running → {completed|failed}` transition happens
    /// exactly once.
    pub fn finalize(&mut self, status: JobStatus, error: Option<String>) -> Result<()> {
        if self.status.is_terminal() {
            return Err(BlogError::InvalidJobTransition {
                from: self.status.as_str().to_string(),
                to: status.as_str().to_string(),
            });
        }
        if !status.is_terminal() {
            return Err(BlogError::InvalidJobTransition {
                from: self.status.as_str().to_string(),
                to: status.as_str().to_string(),
            });
        }
        let now = Utc::now();
        self.status = status;
        self.stage = PipelineStage::Done;
        self.finished_at = Some(now);
        self.duration_ms = Some((now - self.started_at).num_milliseconds().max(0) as u64);
        self.error = error;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JobProgress
// ---------------------------------------------------------------------------

/// Poller-facing view of a job run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobProgress {
    pub id: Uuid,
    pub status: JobStatus,
    pub stage: PipelineStage,
    pub logs: Vec<LogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
