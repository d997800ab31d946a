//! The resolved image reference and the per-image status that carries it
//! between evaluations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A resolved image reference: `name:tag`, optionally pinned to a digest.
///
/// This is the externally persisted "latest" value. The digest is only
/// meaningful for the exact `(name, tag)` pair it was fetched for.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    /// The bare image name, e.g. `"ghcr.io/org/app"`.
    #[serde(rename = "image", default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// The selected tag.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,
    /// Manifest digest of `name:tag`, when reflected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl ImageRef {
    /// Create a reference without a digest.
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
            digest: None,
        }
    }

    /// Returns this reference with the given digest. An empty digest is
    /// stored as no digest.
    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        let digest = digest.into();
        self.digest = if digest.is_empty() { None } else { Some(digest) };
        self
    }

    /// Returns this reference with the digest cleared.
    pub fn without_digest(mut self) -> Self {
        self.digest = None;
        self
    }

    /// Returns `true` if a non-empty digest is attached.
    pub fn has_digest(&self) -> bool {
        self.digest.as_deref().is_some_and(|d| !d.is_empty())
    }

    /// Returns `true` if both references name the same image and tag,
    /// regardless of digest.
    pub fn same_target(&self, other: &ImageRef) -> bool {
        self.name == other.name && self.tag == other.tag
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.tag)?;
        match &self.digest {
            Some(d) if !d.is_empty() => write!(f, "@{d}"),
            _ => Ok(()),
        }
    }
}

/// Observed state of one image policy, owned and persisted by the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyStatus {
    /// The reference selected by the last successful evaluation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_ref: Option<ImageRef>,
    /// The `latest_ref` that was replaced the last time the selected tag
    /// changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_previous_ref: Option<ImageRef>,
}

impl PolicyStatus {
    /// A status with no evaluation recorded yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Tag of the previously observed reference, if any.
    pub fn previous_tag(&self) -> Option<&str> {
        self.observed_previous_ref.as_ref().map(|r| r.tag.as_str())
    }
}
