//! Operator-facing policy configuration.
//!
//! These types mirror the declarative configuration an operator writes for an
//! image: which ordering policy selects the latest tag, how tags are filtered
//! first, and whether the resolved tag's digest is reflected. They are plain
//! data; validation happens when the policy engine constructs a strategy from
//! them.

use serde::{Deserialize, Serialize};

/// Per-image policy configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePolicySpec {
    /// Bare image name the tags belong to (no scheme, tag, or digest).
    pub image: String,
    /// The ordering policy used to pick the latest tag.
    pub policy: PolicyChoice,
    /// Optional filter applied before ordering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_tags: Option<TagFilterSpec>,
    /// Governs the digest of the resolved reference. Unset means `Never`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest_reflection_policy: Option<ReflectionPolicy>,
}

impl ImagePolicySpec {
    /// Create a spec with no filter and no digest reflection.
    pub fn new(image: impl Into<String>, policy: PolicyChoice) -> Self {
        Self {
            image: image.into(),
            policy,
            filter_tags: None,
            digest_reflection_policy: None,
        }
    }

    /// The effective reflection policy.
    pub fn reflection_policy(&self) -> ReflectionPolicy {
        self.digest_reflection_policy.unwrap_or_default()
    }
}

/// Union of the supported ordering policies.
///
/// Exactly one field must be populated. This is checked when the policy is
/// constructed, not when the configuration is parsed, so that an invalid
/// choice surfaces as a policy error rather than a decode error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyChoice {
    /// Semantic version range to check the tags against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semver: Option<SemVerPolicy>,
    /// Lexicographic ordering of the tag names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alphabetical: Option<AlphabeticalPolicy>,
    /// Numerical ordering of the tag names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numerical: Option<NumericalPolicy>,
    /// Ordering by image creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newest: Option<NewestPolicy>,
}

impl PolicyChoice {
    pub fn semver(range: impl Into<String>) -> Self {
        Self {
            semver: Some(SemVerPolicy {
                range: range.into(),
            }),
            ..Default::default()
        }
    }

    pub fn alphabetical(order: impl Into<String>) -> Self {
        Self {
            alphabetical: Some(AlphabeticalPolicy {
                order: order.into(),
            }),
            ..Default::default()
        }
    }

    pub fn numerical(order: impl Into<String>) -> Self {
        Self {
            numerical: Some(NumericalPolicy {
                order: order.into(),
            }),
            ..Default::default()
        }
    }

    pub fn newest(order: impl Into<String>) -> Self {
        Self {
            newest: Some(NewestPolicy {
                order: order.into(),
            }),
            ..Default::default()
        }
    }

    /// Number of populated arms. A valid choice has exactly one.
    pub fn populated(&self) -> usize {
        [
            self.semver.is_some(),
            self.alphabetical.is_some(),
            self.numerical.is_some(),
            self.newest.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }
}

/// Semantic version policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemVerPolicy {
    /// Range the tag must satisfy; the highest satisfying version wins.
    pub range: String,
}

/// Alphabetical ordering policy. Given the letters of the alphabet as tags,
/// ascending order selects `z` and descending order selects `a`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlphabeticalPolicy {
    /// `asc` or `desc`; empty means ascending.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub order: String,
}

/// Numerical ordering policy. Given `0` to `9` as tags, ascending order
/// selects `9` and descending order selects `0`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericalPolicy {
    /// `asc` or `desc`; empty means ascending.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub order: String,
}

/// Creation-time ordering policy. Ascending selects the oldest build,
/// descending the most recent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewestPolicy {
    /// `asc` or `desc`; empty means descending.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub order: String,
}

/// Restricts the evaluated tags to those matching a pattern.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilterSpec {
    /// Regular expression a tag name must match.
    #[serde(default)]
    pub pattern: String,
    /// Capture-group template producing the name used for ordering,
    /// e.g. `$1` or `$version`. Empty keeps the original name.
    #[serde(default)]
    pub extract: String,
}

impl TagFilterSpec {
    pub fn new(pattern: impl Into<String>, extract: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            extract: extract.into(),
        }
    }
}

/// When to reflect a value from the registry into the resolved reference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReflectionPolicy {
    /// Always reflect the latest registry value, overwriting an existing one.
    Always,
    /// Reflect only while the value is empty; never overwrite it afterwards.
    IfNotPresent,
    /// Never reflect.
    #[default]
    Never,
}

impl std::fmt::Display for ReflectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Always => "Always",
            Self::IfNotPresent => "IfNotPresent",
            Self::Never => "Never",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populated_counts_arms() {
        assert_eq!(PolicyChoice::default().populated(), 0);
        assert_eq!(PolicyChoice::semver("1.0.x").populated(), 1);

        let mut both = PolicyChoice::numerical("asc");
        both.alphabetical = Some(AlphabeticalPolicy::default());
        assert_eq!(both.populated(), 2);
    }

    #[test]
    fn reflection_defaults_to_never() {
        let spec = ImagePolicySpec::new("app", PolicyChoice::alphabetical(""));
        assert_eq!(spec.reflection_policy(), ReflectionPolicy::Never);
    }

    #[test]
    fn spec_from_toml() {
        let spec: ImagePolicySpec = toml::from_str(
            r#"
            image = "ghcr.io/org/app"
            digestReflectionPolicy = "IfNotPresent"

            [policy.semver]
            range = ">=1.0, <2.0"

            [filterTags]
            pattern = '^v(?P<version>.*)$'
            extract = '$version'
            "#,
        )
        .unwrap();

        assert_eq!(spec.image, "ghcr.io/org/app");
        assert_eq!(spec.policy, PolicyChoice::semver(">=1.0, <2.0"));
        assert_eq!(
            spec.filter_tags,
            Some(TagFilterSpec::new("^v(?P<version>.*)$", "$version"))
        );
        assert_eq!(spec.reflection_policy(), ReflectionPolicy::IfNotPresent);
    }

    #[test]
    fn order_is_optional_in_config() {
        let choice: PolicyChoice = serde_json::from_str(r#"{"newest":{}}"#).unwrap();
        assert_eq!(choice, PolicyChoice::newest(""));
    }

    #[test]
    fn unknown_reflection_policy_is_rejected() {
        let res: Result<ReflectionPolicy, _> = serde_json::from_str(r#""Sometimes""#);
        assert!(res.is_err());
    }
}
