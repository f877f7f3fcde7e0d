use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The health probe failed and a retry did not help.
    #[error("backend-not-available")]
    BackendNotAvailable,

    /// The record belongs to a barangay other than the one acting on it.
    #[error("{entity} {id} is outside barangay {barangay_id}")]
    OutOfScope {
        entity: &'static str,
        id: i64,
        barangay_id: String,
    },

    #[error("{message} ({status})")]
    Http { status: StatusCode, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}
