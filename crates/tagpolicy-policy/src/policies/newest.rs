use tagpolicy_types::Tag;

use crate::error::{PolicyError, Result};
use crate::order::OrderDirection;
use crate::policies::{select_extreme, Policer};

/// Creation-time ordering policy.
///
/// Compares `created` at one-second resolution. Tags without a creation
/// time count as the oldest possible. Descending (the default) selects the
/// most recently built tag, ascending the oldest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Newest {
    order: OrderDirection,
}

impl Newest {
    /// Construct from an `asc`/`desc` argument; empty means descending.
    pub fn new(order: &str) -> Result<Self> {
        Self::with_default(order, OrderDirection::Descending)
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

impl Policer for Newest {
    fn latest(&self, tags: &[Tag]) -> Result<Tag> {
        // Descending means "newest": the greatest timestamp.
        let direction = match self.order {
            OrderDirection::Descending => OrderDirection::Ascending,
            OrderDirection::Ascending => OrderDirection::Descending,
        };
        select_extreme(tags, direction, |a, b| a.created_unix().cmp(&b.created_unix()))
            .cloned()
            .ok_or(PolicyError::EmptyInput)
    }
}
