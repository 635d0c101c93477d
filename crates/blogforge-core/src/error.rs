use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("no pending keyword available")]
    NoKeywordAvailable,

    #[error("topic resolution failed: {0}")]
    TopicResolutionFailed(String),

    #[error("content generation failed: {0}")]
    ContentGenerationFailed(String),

    #[error("keyword not found: {0}")]
    KeywordNotFound(Uuid),

    #[error("topic not found: {0}")]
    TopicNotFound(Uuid),

    #[error("post not found: {0}")]
    PostNotFound(String),

    #[error("job run not found: {0}")]
    JobRunNotFound(Uuid),

    #[error("invalid job transition from {from} to {to}")]
    InvalidJobTransition { from: String, to: String },

    #[error("store error: {0}")]
    Store(String),

    #[error("generator backend error: {0}")]
    Generator(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<genai_client::GenError> for BlogError {
    fn from(err: genai_client::GenError) -> Self {
        BlogError::Generator(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BlogError>;
