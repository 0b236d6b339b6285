use reqwest::StatusCode;
use thiserror::Error;

/// Faults from the hosted speech-to-text or chat API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("failed to read audio file: {0}")]
    Io(#[from] std::io::Error),

    #[error("chat completion returned no choices")]
    NoChoices,

    #[error("chat completion choice has no content")]
    EmptyContent,
}

/// Outcome of a single relay loop step that is not a success.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    #[error("invalid base64 audio payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("failed to materialize audio: {0}")]
    TempFile(#[source] std::io::Error),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("peer disconnected")]
    PeerDisconnected,
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::MalformedMessage(err.to_string())
    }
}

pub type RelayResult<T> = Result<T, RelayError>;
