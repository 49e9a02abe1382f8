use thiserror::Error;

/// Application-wide error types for the harvest pipeline.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (fetching a page or feed).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Control port replied with something other than the expected codes.
    #[error("unexpected control response: {0}")]
    ControlProtocol(String),

    /// Control port rejected the password (515).
    #[error("authentication failed: incorrect password")]
    AuthenticationFailed,

    /// Control port requires authentication before signals (514).
    #[error("authentication required")]
    AuthenticationRequired,

    /// Feed (sitemap/RSS) could not be decoded or yielded nothing.
    #[error("feed error: {0}")]
    FeedError(String),

    /// HTML content could not be parsed into a vacancy.
    #[error("parse error: {0}")]
    ParseError(String),

    /// Persistence operation failed.
    #[error("database error: {0}")]
    DatabaseError(String),

    /// No record matched the given id.
    #[error("no document found with the id {0}")]
    NotFound(String),

    /// Outbound RPC call failed.
    #[error("rpc error: {0}")]
    RpcError(String),

    /// Invalid or missing configuration value.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// A retry policy was asked about a negative attempt.
    #[error("attempts must be greater than zero")]
    InvalidAttempt,

    /// A retry-governed loop ran out of attempts.
    #[error("maximum retry attempts exceeded")]
    RetryExhausted,
}

impl AppError {
    /// Returns true if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::NetworkError(_)
            | AppError::Timeout(_)
            | AppError::AuthenticationRequired
            | AppError::RetryExhausted => true,
            AppError::HttpError(msg) => {
                msg.contains("timeout") || msg.contains("connect") || msg.contains("reset")
            }
            _ => false,
        }
    }
}
