use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An image tag as observed in a registry scan.
///
/// Tags are immutable once observed. The name is the identity; the creation
/// time is only consulted by the newest-first ordering and may be unknown.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// The tag string, e.g. `"v1.2.3"`.
    pub name: String,
    /// When the tagged image was built, if the registry reported it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

impl Tag {
    /// Create a tag with an unknown creation time.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created: None,
        }
    }

    /// Create a tag with a known creation time.
    pub fn with_created(name: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            created: Some(created),
        }
    }

    /// Creation time in whole seconds since the UNIX epoch.
    ///
    /// An unknown creation time maps to the earliest representable instant,
    /// so it always sorts as the oldest tag.
    pub fn created_unix(&self) -> i64 {
        self.created
            .map(|t| t.timestamp())
            .unwrap_or(DateTime::<Utc>::MIN_UTC.timestamp())
    }

    /// Returns a copy of this tag under a different name, keeping the
    /// creation time.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created: self.created,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
