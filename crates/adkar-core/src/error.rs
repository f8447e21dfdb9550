use thiserror::Error;

/// Top-level error type for the ADKAR assistant.
///
/// The chat crate defines its own `ChatError` and converts from this type so
/// that `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdkarError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

}

impl AdkarError {
    /// Whether this error means the file simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AdkarError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

impl From<toml::de::Error> for AdkarError {
    fn from(err: toml::de::Error) -> Self {
        AdkarError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AdkarError {
    fn from(err: toml::ser::Error) -> Self {
        AdkarError::Config(err.to_string())
    }
}

/// A specialized `Result` type for ADKAR assistant operations.
pub type Result<T> = std::result::Result<T, AdkarError>;
