use thiserror::Error;

/// Errors that can occur while filtering and ordering tags.
///
/// Configuration errors ([`is_configuration`](Self::is_configuration)) are
/// permanent until the operator changes the policy. The remaining variants
/// depend on the observed tags and may clear once the tag source changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// The filter pattern is not a valid regular expression.
    #[error("invalid tag filter pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The semver range expression cannot be parsed.
    #[error("invalid semver range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },

    /// The order argument is neither `asc` nor `desc`.
    #[error("invalid order argument provided: '{order}', must be one of: asc, desc")]
    InvalidOrder { order: String },

    /// The policy choice is empty, ambiguous, or failed to construct.
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    /// An ordering policy was asked to pick from zero tags.
    #[error("tag list argument cannot be empty")]
    EmptyInput,

    /// The tag source has not produced any tags.
    #[error("no tags available to evaluate")]
    NoTagsAvailable,

    /// No tag parses as a version satisfying the range.
    #[error("unable to determine latest version from provided list for range '{range}'")]
    NoMatchingVersion { range: String },

    /// A tag name is not a number under the numerical policy.
    #[error("failed to parse invalid numeric value '{value}'")]
    InvalidNumericValue { value: String },
}

impl PolicyError {
    /// Returns `true` for errors caused by the policy configuration itself.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidPattern { .. }
                | Self::InvalidRange { .. }
                | Self::InvalidOrder { .. }
                | Self::InvalidPolicy(_)
        )
    }

    /// Returns `true` when the tag source simply has nothing to offer yet.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::NoTagsAvailable)
    }
}

/// Convenience type alias for policy operations.
pub type Result<T> = std::result::Result<T, PolicyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(PolicyError::InvalidOrder { order: "up".into() }.is_configuration());
        assert!(PolicyError::InvalidPolicy("none".into()).is_configuration());
        assert!(!PolicyError::EmptyInput.is_configuration());
        assert!(PolicyError::NoTagsAvailable.is_transient());
        assert!(!PolicyError::InvalidNumericValue { value: "b".into() }.is_transient());
        assert!(!PolicyError::NoMatchingVersion { range: "1.x".into() }.is_configuration());
    }

    #[test]
    fn messages() {
        let err = PolicyError::InvalidOrder {
            order: "invalid".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid order argument provided: 'invalid', must be one of: asc, desc"
        );
    }
}
