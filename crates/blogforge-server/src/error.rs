use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use blogforge_core::BlogError;

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Private sentinel error type used to carry an explicit HTTP 400 through
/// the `anyhow::Error` chain without touching the `BlogError` enum.
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(b) = self.0.downcast_ref::<BadRequestError>() {
            let body = serde_json::json!({ "error": b.0.clone() });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }

        let status = if let Some(e) = self.0.downcast_ref::<BlogError>() {
            match e {
                BlogError::KeywordNotFound(_)
                | BlogError::TopicNotFound(_)
                | BlogError::PostNotFound(_)
                | BlogError::JobRunNotFound(_) => StatusCode::NOT_FOUND,
                BlogError::NoKeywordAvailable => StatusCode::CONFLICT,
                BlogError::InvalidJobTransition { .. }
                | BlogError::TopicResolutionFailed(_)
                | BlogError::ContentGenerationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
                BlogError::Store(_)
                | BlogError::Generator(_)
                | BlogError::Io(_)
                | BlogError::Yaml(_)
                | BlogError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
