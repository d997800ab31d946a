//! The four ordering policies.
//!
//! Each policy is a pure reduction from a tag list to a single "latest" tag.
//! [`Policy`] closes the set: it is what the selector builds from a
//! [`PolicyChoice`](tagpolicy_types::PolicyChoice), and it dispatches to the
//! concrete strategy.

pub mod alphabetical;
pub mod newest;
pub mod numerical;
pub mod semver;

use std::cmp::Ordering;
use std::fmt;

use tagpolicy_types::Tag;

use crate::error::Result;
use crate::order::OrderDirection;

pub use self::alphabetical::Alphabetical;
pub use self::newest::Newest;
pub use self::numerical::Numerical;
pub use self::semver::SemVer;

/// A strategy that picks the latest tag from a list.
///
/// Implementations never reorder the input and fail with
/// [`PolicyError::EmptyInput`](crate::PolicyError::EmptyInput) when it is
/// empty.
pub trait Policer: Send + Sync {
    /// Return the latest tag under this policy.
    fn latest(&self, tags: &[Tag]) -> Result<Tag>;
}

/// One of the built-in ordering policies.
#[derive(Clone, Debug)]
pub enum Policy {
    SemVer(SemVer),
    Alphabetical(Alphabetical),
    Numerical(Numerical),
    Newest(Newest),
}

impl Policy {
    /// Short name of the policy kind, for logs and messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Policy::SemVer(_) => "semver",
            Policy::Alphabetical(_) => "alphabetical",
            Policy::Numerical(_) => "numerical",
            Policy::Newest(_) => "newest",
        }
    }
}

impl Policer for Policy {
    fn latest(&self, tags: &[Tag]) -> Result<Tag> {
        match self {
            Policy::SemVer(p) => p.latest(tags),
            Policy::Alphabetical(p) => p.latest(tags),
            Policy::Numerical(p) => p.latest(tags),
            Policy::Newest(p) => p.latest(tags),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::SemVer(p) => write!(f, "semver({})", p.range()),
            Policy::Alphabetical(p) => write!(f, "alphabetical({})", p.order()),
            Policy::Numerical(p) => write!(f, "numerical({})", p.order()),
            Policy::Newest(p) => write!(f, "newest({})", p.order()),
        }
    }
}

/// Select the extreme item named by `direction` in a single pass.
///
/// Ascending keeps the greatest item, descending the least. On ties the
/// first item encountered wins.
pub(crate) fn select_extreme<T, F>(
    items: impl IntoIterator<Item = T>,
    direction: OrderDirection,
    mut cmp: F,
) -> Option<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let wanted = match direction {
        OrderDirection::Ascending => Ordering::Greater,
        OrderDirection::Descending => Ordering::Less,
    };

    let mut best: Option<T> = None;
    for item in items {
        match &best {
            Some(current) if cmp(&item, current) != wanted => {}
            _ => best = Some(item),
        }
    }
    best
}
