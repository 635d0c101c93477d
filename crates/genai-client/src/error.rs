use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Failed to parse backend response: {source}\n  body: {body}")]
    Parse {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Image upload failed: {0}")]
    Upload(String),
}

impl From<reqwest::Error> for GenError {
    fn from(err: reqwest::Error) -> Self {
        GenError::Http(err.to_string())
    }
}
