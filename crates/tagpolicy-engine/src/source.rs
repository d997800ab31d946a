//! The [`TagSource`] trait and an in-memory implementation.
//!
//! A tag source hands the engine the tags most recently observed for an
//! image. How they were scanned and stored is the source's business.

use std::collections::HashMap;
use std::sync::RwLock;

use tagpolicy_types::Tag;

use crate::error::{EngineError, Result};

/// Supplies the observed tags of an image.
///
/// Implementations must be thread-safe (`Send + Sync`). An image that has
/// not been scanned yet yields an empty list, not an error.
pub trait TagSource: Send + Sync {
    /// All tags currently known for `image`.
    fn tags(&self, image: &str) -> Result<Vec<Tag>>;
}

/// An in-memory [`TagSource`].
///
/// Tags live in a `HashMap` behind a `RwLock`, keyed by image name.
#[derive(Debug, Default)]
pub struct InMemoryTagSource {
    images: RwLock<HashMap<String, Vec<Tag>>>,
}

impl InMemoryTagSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tags recorded for `image`, as a fresh scan would.
    pub fn set_tags(&self, image: &str, tags: Vec<Tag>) -> Result<()> {
        let mut images = self.images.write().map_err(|e| EngineError::Source {
            image: image.to_string(),
            message: format!("lock poisoned: {e}"),
        })?;
        images.insert(image.to_string(), tags);
        Ok(())
    }
}

impl TagSource for InMemoryTagSource {
    fn tags(&self, image: &str) -> Result<Vec<Tag>> {
        let images = self.images.read().map_err(|e| EngineError::Source {
            image: image.to_string(),
            message: format!("lock poisoned: {e}"),
        })?;
        Ok(images.get(image).cloned().unwrap_or_default())
    }
}
