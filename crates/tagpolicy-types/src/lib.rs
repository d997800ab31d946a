//! Foundation types for tagpolicy.
//!
//! This crate provides the plain data types shared by the policy engine and
//! its collaborators. Nothing here makes a decision: the types only carry
//! observed tags, operator configuration, and the persisted result of an
//! evaluation.
//!
//! # Key Types
//!
//! - [`Tag`]: An observed image tag with an optional creation time
//! - [`ImageRef`]: The resolved `name:tag@digest` reference persisted between evaluations
//! - [`PolicyChoice`]: Union of the four ordering policies, exactly one populated
//! - [`TagFilterSpec`]: Regex pattern plus optional capture extraction
//! - [`ReflectionPolicy`]: When a digest is attached to the resolved reference
//! - [`ImagePolicySpec`] / [`PolicyStatus`]: Per-image configuration and state

pub mod error;
pub mod names;
pub mod reference;
pub mod spec;
pub mod tag;

pub use error::{Result, TypeError};
pub use names::validate_image_name;
pub use reference::{ImageRef, PolicyStatus};
pub use spec::{
    AlphabeticalPolicy, ImagePolicySpec, NewestPolicy, NumericalPolicy, PolicyChoice,
    ReflectionPolicy, SemVerPolicy, TagFilterSpec,
};
pub use tag::Tag;
