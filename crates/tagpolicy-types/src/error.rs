use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid image '{image}': {reason}")]
    InvalidImage { image: String, reason: String },
}

/// Convenience type alias for type operations.
pub type Result<T> = std::result::Result<T, TypeError>;
