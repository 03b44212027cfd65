//! Error types for the QQ Music API client.

use thiserror::Error;

/// Errors that can occur when interacting with the QQ Music API.
#[derive(Debug, Error)]
pub enum QQMusicError {
    /// HTTP transport error (connection refused, timeout, client build failure, etc.).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the credential (`request.code == 1000`).
    ///
    /// The caller is expected to refresh the token via
    /// [`QQMusic::update_credentials`](crate::QQMusic::update_credentials)
    /// and retry.
    #[error("authentication failed, check the QQ Music token")]
    Authentication,

    /// The server answered without a payload for a reason other than an
    /// authentication failure: bad parameters, unknown module/method, or a
    /// transient server problem.
    #[error("failed to retrieve endpoint data (code {code}), check the submitted parameters")]
    DataRetrieval {
        /// `request.code` as reported by the server (0 when absent).
        code: i64,
    },

    /// A connection was requested after the pool had been shut down.
    #[error("connection pool is closed")]
    PoolClosed,

    /// Account id and token must be both empty or both set.
    #[error("account id and auth token must be both empty or both non-empty")]
    InvalidCredential,

    /// Failed to parse a JSON response body.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for other errors (unexpected response shape, bad arguments).
    #[error("{0}")]
    Other(String),
}

/// Convenience alias for `Result<T, QQMusicError>`.
pub type Result<T> = std::result::Result<T, QQMusicError>;
