//! Order direction shared by the alphabetical, numerical, and newest
//! policies.
//!
//! A direction does not describe how a list is sorted; it names which
//! extreme of the ordering is "latest". Ascending picks the greatest key,
//! descending the least.

use std::fmt;

use crate::error::{PolicyError, Result};

/// Which extreme of an ordering a policy selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderDirection {
    /// Select the greatest key.
    Ascending,
    /// Select the least key.
    Descending,
}

impl OrderDirection {
    /// Parse an `asc`/`desc` order argument (ASCII case-insensitive).
    ///
    /// An empty argument yields `default`; anything else is
    /// [`PolicyError::InvalidOrder`].
    pub fn parse(order: &str, default: OrderDirection) -> Result<Self> {
        if order.is_empty() {
            Ok(default)
        } else if order.eq_ignore_ascii_case("asc") {
            Ok(Self::Ascending)
        } else if order.eq_ignore_ascii_case("desc") {
            Ok(Self::Descending)
        } else {
            Err(PolicyError::InvalidOrder {
                order: order.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction each policy falls back to when the order argument is empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderDefaults {
    pub alphabetical: OrderDirection,
    pub numerical: OrderDirection,
    pub newest: OrderDirection,
}

impl Default for OrderDefaults {
    fn default() -> Self {
        Self {
            alphabetical: OrderDirection::Ascending,
            numerical: OrderDirection::Ascending,
            newest: OrderDirection::Descending,
        }
    }
}
