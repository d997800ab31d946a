use tagpolicy_types::Tag;

use crate::error::{PolicyError, Result};
use crate::order::OrderDirection;
use crate::policies::{select_extreme, Policer};

/// Alphabetical ordering policy.
///
/// Compares tag names byte-wise. Ascending selects the lexicographically
/// greatest name, descending the least.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabetical {
    order: OrderDirection,
}

impl Alphabetical {
    /// Construct from an `asc`/`desc` argument; empty means ascending.
    pub fn new(order: &str) -> Result<Self> {
        Self::with_default(order, OrderDirection::Ascending)
    }

    /// Construct with an explicit fallback for an empty order argument.
    pub fn with_default(order: &str, default: OrderDirection) -> Result<Self> {
        Ok(Self {
            order: OrderDirection::parse(order, default)?,
        })
    }

    pub fn order(&self) -> OrderDirection {
        self.order
    }
}

impl Policer for Alphabetical {
    fn latest(&self, tags: &[Tag]) -> Result<Tag> {
        select_extreme(tags, self.order, |a, b| a.name.cmp(&b.name))
            .cloned()
            .ok_or(PolicyError::EmptyInput)
    }
}
