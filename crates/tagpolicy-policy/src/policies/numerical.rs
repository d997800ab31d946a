use tagpolicy_types::Tag;

use crate::error::{PolicyError, Result};
use crate::order::OrderDirection;
use crate::policies::{select_extreme, Policer};

/// Numerical ordering policy.
///
/// Every tag name must parse as a floating point number. A single
/// unparsable name fails the whole evaluation; nothing is skipped.
/// Ascending selects the greatest value, descending the least.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Numerical {
    order: OrderDirection,
}

impl Numerical {
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

fn parse_value(tag: &Tag) -> Result<f64> {
    match tag.name.parse::<f64>() {
        Ok(v) if !v.is_nan() => Ok(v),
        _ => Err(PolicyError::InvalidNumericValue {
            value: tag.name.clone(),
        }),
    }
}

impl Policer for Numerical {
    fn latest(&self, tags: &[Tag]) -> Result<Tag> {
        if tags.is_empty() {
            return Err(PolicyError::EmptyInput);
        }

        let values = tags
            .iter()
            .map(|t| parse_value(t).map(|v| (v, t)))
            .collect::<Result<Vec<_>>>()?;

        select_extreme(values, self.order, |a, b| a.0.total_cmp(&b.0))
            .map(|(_, tag)| tag.clone())
            .ok_or(PolicyError::EmptyInput)
    }
}
