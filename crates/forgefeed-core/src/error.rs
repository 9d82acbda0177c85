use thiserror::Error;

/// All the ways things can go wrong in ForgeFeed
///
/// We use thiserror here because it generates the boilerplate for us.
/// Life's too short to manually implement Display and Error traits.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Malformed response: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("No account signed in")]
    NoSession,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl Error {
    /// Whether a user-initiated retry (pull-to-refresh, retry button) can
    /// plausibly succeed. Malformed responses count as recoverable: the
    /// backend may simply have had a bad moment.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::NetworkError(_) | Error::ValidationError(_) | Error::RateLimited
        )
    }
}
