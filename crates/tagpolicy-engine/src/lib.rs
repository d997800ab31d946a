//! Evaluation passes for tagpolicy.
//!
//! An evaluation reads the observed tags of one image, resolves the latest
//! tag through the configured policy, reflects the digest of the resolved
//! reference, and hands back the status the caller should persist next.
//!
//! # Quick Start
//!
//! ```rust
//! use tagpolicy_engine::{InMemoryTagSource, PolicyEvaluator, StaticDigestResolver};
//! use tagpolicy_types::{ImagePolicySpec, PolicyChoice, PolicyStatus, Tag};
//!
//! let source = InMemoryTagSource::new();
//! source
//!     .set_tags("ghcr.io/org/app", vec![Tag::new("1.0.0"), Tag::new("1.0.1"), Tag::new("2.0.0")])
//!     .unwrap();
//!
//! let evaluator = PolicyEvaluator::new(source, StaticDigestResolver::new());
//! let spec = ImagePolicySpec::new("ghcr.io/org/app", PolicyChoice::semver("1.0.x"));
//! let out = evaluator.evaluate(&spec, &PolicyStatus::empty()).unwrap();
//! assert_eq!(out.reference.to_string(), "ghcr.io/org/app:1.0.1");
//! ```

pub mod digest;
pub mod error;
pub mod evaluator;
pub mod reflect;
pub mod source;

pub use digest::{DigestResolver, StaticDigestResolver};
pub use error::{DigestError, Disposition, EngineError, Result};
pub use evaluator::{compose_ready_message, validate_spec, Evaluation, PolicyEvaluator};
pub use reflect::{advance, needs_digest, reflect, ReferenceTransition};
pub use source::{InMemoryTagSource, TagSource};
