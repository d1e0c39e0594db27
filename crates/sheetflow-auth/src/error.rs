//! Error types for token acquisition

/// Errors raised while building or exchanging a service-account assertion
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    /// Credentials are missing or empty
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The private key could not be parsed or used for signing
    #[error("invalid service-account key: {0}")]
    InvalidKey(String),

    /// The token endpoint answered without an access token
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// The request never produced a response
    #[error("http error: {0}")]
    Http(String),
}

impl AuthError {
    /// Create configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether the error stems from local configuration rather than the remote side
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::InvalidKey(_))
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}
