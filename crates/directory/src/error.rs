//! Error types for calls to the remote services.

use thiserror::Error;

/// Failure of a call to the directory or the mailer.
///
/// The workflows pass these through untouched; callers decide how to
/// present them.
#[derive(Debug, Error)]
pub enum RemoteCallError {
    #[error("remote http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote service rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid remote response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid service endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("remote service unavailable: {0}")]
    Unavailable(String),
}

pub type RemoteResult<T> = Result<T, RemoteCallError>;
