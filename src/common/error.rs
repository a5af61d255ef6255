//! Error types for minits

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // === Config Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config load error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // === Replica Errors ===
    #[error("Write rejected: {0}")]
    Rejected(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("HTTP error: {0}")]
    Http(String),

    // === Coordination Errors ===
    #[error("Writer {writer_id} failed: {source}")]
    WriterFailed {
        writer_id: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("Consistency unreachable: need {need} acknowledgements, got {succeeded}")]
    QuorumUnreachable { need: usize, succeeded: usize },

    #[error("Write timed out after {0:?}")]
    WriteTimeout(Duration),

    // === Generic ===
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Wrap a writer's failure with the index of the writer that produced it.
    pub fn writer(writer_id: usize, source: Error) -> Self {
        Error::WriterFailed {
            writer_id,
            source: Box::new(source),
        }
    }

    /// The outcome of a timed-out write is unknown: some replicas may have
    /// accepted it.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::WriteTimeout(_))
    }

    /// Is this a retryable error?
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::WriteTimeout(_) | Error::ConnectionFailed(_) | Error::QuorumUnreachable { .. } => {
                true
            }
            Error::WriterFailed { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Convert to HTTP status code
    pub fn to_http_status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Error::InvalidConfig(_) | Error::InvalidRequest(_) | Error::Serialization(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::WriteTimeout(_) => StatusCode::REQUEST_TIMEOUT,
            Error::QuorumUnreachable { .. } | Error::ConnectionFailed(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Error::WriterFailed { source, .. } => source.to_http_status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            Error::ConnectionFailed(e.to_string())
        } else {
            Error::Http(e.to_string())
        }
    }
}
