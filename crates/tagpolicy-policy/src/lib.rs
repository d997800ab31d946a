//! Tag policy evaluation for tagpolicy.
//!
//! Turns a raw list of observed tags into the single tag that best satisfies
//! an operator-declared policy. Evaluation runs in three steps:
//!
//! 1. **Filter**: an optional regex narrows the tags and may extract a
//!    capture group to evaluate instead of the full name ([`filter`]).
//! 2. **Order**: one of four policies reduces the tags to a winner
//!    ([`policies`]): semantic-version range, alphabetical, numerical, or
//!    newest by creation time.
//! 3. **Map back**: the winning extracted name is mapped back to the
//!    original tag ([`resolve`]).
//!
//! Everything here is pure: no I/O, no shared mutable state, and the caller's
//! tag slice is never reordered.
//!
//! # Quick Start
//!
//! ```rust
//! use tagpolicy_policy::resolve;
//! use tagpolicy_types::{PolicyChoice, Tag, TagFilterSpec};
//!
//! let tags: Vec<Tag> = ["v1.0.0", "v1.0.1", "v1.2.0", "nightly"]
//!     .into_iter()
//!     .map(Tag::from)
//!     .collect();
//!
//! let latest = resolve(&tags, None, &PolicyChoice::semver("1.0.x")).unwrap();
//! assert_eq!(latest.name, "v1.0.1");
//!
//! let filter = TagFilterSpec::new(r"^v1\.(\d+)\.0$", "$1");
//! let latest = resolve(&tags, Some(&filter), &PolicyChoice::numerical("asc")).unwrap();
//! assert_eq!(latest.name, "v1.2.0");
//! ```

pub mod error;
pub mod filter;
pub mod order;
pub mod policies;
pub mod resolve;
pub mod selector;

// Re-exports for convenience.
pub use error::{PolicyError, Result};
pub use filter::{apply_filter, FilteredView, RegexFilter};
pub use order::{OrderDefaults, OrderDirection};
pub use policies::alphabetical::Alphabetical;
pub use policies::newest::Newest;
pub use policies::numerical::Numerical;
pub use policies::semver::SemVer;
pub use policies::{Policer, Policy};
pub use resolve::{resolve, resolve_with};
pub use selector::{policy_from_choice, policy_from_choice_with};
