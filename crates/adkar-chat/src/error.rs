//! Error types for the conversation core.

use adkar_core::error::AdkarError;

/// Errors from the conversation core.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("a reply is already in progress")]
    Busy,
    #[error("no user message is awaiting a reply")]
    NoPendingExchange,
    #[error("rating must be between 0 and 5, got {0}")]
    InvalidRating(u8),
    #[error("catalog error: {0}")]
    Catalog(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),
    #[error("feedback sink error: {0}")]
    Sink(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<AdkarError> for ChatError {
    fn from(err: AdkarError) -> Self {
        ChatError::Config(err.to_string())
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Backend(err.to_string())
    }
}

impl From<toml::de::Error> for ChatError {
    fn from(err: toml::de::Error) -> Self {
        ChatError::Catalog(err.to_string())
    }
}
