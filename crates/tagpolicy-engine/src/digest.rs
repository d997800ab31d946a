//! The [`DigestResolver`] trait and a static implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use tagpolicy_types::ImageRef;

use crate::error::DigestError;

/// Looks up the manifest digest of a resolved reference.
///
/// Implementations own retries, timeouts, and credentials. The engine calls
/// this at most once per evaluation and only when the reflection policy
/// requires it.
pub trait DigestResolver: Send + Sync {
    fn resolve_digest(&self, reference: &ImageRef) -> Result<String, DigestError>;
}

/// A [`DigestResolver`] backed by a fixed `(image, tag) -> digest` table.
#[derive(Debug, Default)]
pub struct StaticDigestResolver {
    digests: RwLock<HashMap<(String, String), String>>,
}

impl StaticDigestResolver {
    /// Create an empty resolver; every lookup fails with `NotFound`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the digest of `image:tag`, replacing any previous value.
    pub fn insert(&self, image: &str, tag: &str, digest: &str) -> Result<(), DigestError> {
        let mut digests = self.digests.write().map_err(|e| DigestError::Fetch {
            reference: format!("{image}:{tag}"),
            message: format!("lock poisoned: {e}"),
        })?;
        digests.insert((image.to_string(), tag.to_string()), digest.to_string());
        Ok(())
    }
}

impl DigestResolver for StaticDigestResolver {
    fn resolve_digest(&self, reference: &ImageRef) -> Result<String, DigestError> {
        let digests = self.digests.read().map_err(|e| DigestError::Fetch {
            reference: reference.to_string(),
            message: format!("lock poisoned: {e}"),
        })?;
        digests
            .get(&(reference.name.clone(), reference.tag.clone()))
            .cloned()
            .ok_or_else(|| DigestError::NotFound {
                reference: reference.to_string(),
            })
    }
}
