//! Bridge errors. Exactly two kinds reach the caller.

/// Result type for bridge operations
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Caller input violated a pre-condition. Raised before the provider is touched.
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    /// Provider rejected, returned a malformed value, or is not bound.
    #[error("provider error: {0}")]
    Provider(#[source] anyhow::Error),
}

impl BridgeError {
    pub fn illegal_argument(msg: impl Into<String>) -> Self { Self::IllegalArgument(msg.into()) }

    /// Shape mismatch or post-condition violation on a provider response.
    pub fn provider(msg: impl std::fmt::Display) -> Self { Self::Provider(anyhow::anyhow!("{}", msg)) }

    /// Wraps a failure raised by the provider itself.
    pub fn from_provider(err: anyhow::Error) -> Self { Self::Provider(err) }

    pub fn is_illegal_argument(&self) -> bool { matches!(self, Self::IllegalArgument(_)) }

    pub fn is_provider(&self) -> bool { matches!(self, Self::Provider(_)) }

    /// Short machine-readable tag, used by the CLI error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IllegalArgument(_) => "illegal_argument",
            Self::Provider(_) => "provider",
        }
    }
}
