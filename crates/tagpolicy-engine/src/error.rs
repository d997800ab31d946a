//! Error types for evaluation passes.

use thiserror::Error;

use tagpolicy_policy::PolicyError;
use tagpolicy_types::TypeError;

/// Errors returned by a [`DigestResolver`](crate::DigestResolver).
///
/// The engine treats these as opaque and only propagates them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestError {
    /// The registry has no manifest for the reference.
    #[error("digest not found for {reference}")]
    NotFound { reference: String },

    /// The lookup itself failed.
    #[error("failed to fetch digest for {reference}: {message}")]
    Fetch { reference: String, message: String },
}

/// Errors that can occur during an evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Filtering or ordering the tags failed.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// The configured image name is not a bare repository reference.
    #[error(transparent)]
    InvalidImage(#[from] TypeError),

    /// The digest lookup for the resolved reference failed.
    #[error(transparent)]
    Digest(#[from] DigestError),

    /// The tag source could not be read.
    #[error("failed to read tags for '{image}': {message}")]
    Source { image: String, message: String },
}

/// How a caller should react to a failed evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// The configuration is invalid; retrying cannot help until it changes.
    Stall,
    /// The tag source has nothing yet; evaluate again when it changes.
    DependencyNotReady,
    /// Anything else; retry with backoff.
    Retry,
}

impl Disposition {
    pub fn should_retry(&self) -> bool {
        !matches!(self, Self::Stall)
    }
}

impl EngineError {
    /// Classify this error for the caller's retry logic.
    pub fn disposition(&self) -> Disposition {
        match self {
            Self::InvalidImage(_) => Disposition::Stall,
            Self::Policy(e) if e.is_configuration() => Disposition::Stall,
            Self::Policy(PolicyError::NoTagsAvailable) => Disposition::DependencyNotReady,
            _ => Disposition::Retry,
        }
    }
}

/// Convenience type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
