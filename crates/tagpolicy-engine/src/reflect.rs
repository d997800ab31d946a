//! Digest reflection state machine.
//!
//! Decides what digest the next persisted reference carries, given the
//! reference resolved by this pass, the one persisted by the previous pass,
//! and the [`ReflectionPolicy`].
//!
//! # Invariants
//!
//! - A digest belongs to exactly one `(name, tag)`. When the resolved target
//!   differs from the previous one, the digest is cleared *before* the
//!   reflection policy is consulted, so `IfNotPresent` fetches again.
//! - `Never` always yields no digest, even if one was persisted.
//! - `Always` fetches on every pass.
//! - Nothing is mutated: the previous reference is only read, and a failed
//!   fetch returns an error without producing a reference.
//!
//! | target vs. previous | policy         | digest                          |
//! |---------------------|----------------|---------------------------------|
//! | same                | `Never`        | cleared                         |
//! | same                | `Always`       | fetched                         |
//! | same                | `IfNotPresent` | kept if present, else fetched   |
//! | different           | `Never`        | none                            |
//! | different           | `Always`       | fetched                         |
//! | different           | `IfNotPresent` | fetched                         |

use tracing::debug;

use tagpolicy_types::{ImageRef, ReflectionPolicy};

use crate::error::DigestError;

/// How the resolved reference relates to the previously persisted one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReferenceTransition {
    /// Same `(name, tag)` as before; carries the previous reference,
    /// digest included.
    Unchanged(ImageRef),
    /// A different target (or no previous reference); carries the new
    /// reference with its digest cleared.
    Changed(ImageRef),
}

impl ReferenceTransition {
    /// Compare a freshly resolved `candidate` against `previous`.
    pub fn between(candidate: ImageRef, previous: Option<&ImageRef>) -> Self {
        match previous {
            Some(prev) if prev.same_target(&candidate) => Self::Unchanged(prev.clone()),
            _ => Self::Changed(candidate.without_digest()),
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }

    pub fn reference(&self) -> &ImageRef {
        match self {
            Self::Unchanged(r) | Self::Changed(r) => r,
        }
    }

    pub fn into_reference(self) -> ImageRef {
        match self {
            Self::Unchanged(r) | Self::Changed(r) => r,
        }
    }
}

/// Returns `true` if applying `policy` to `transition` requires a digest
/// lookup.
pub fn needs_digest(transition: &ReferenceTransition, policy: ReflectionPolicy) -> bool {
    match policy {
        ReflectionPolicy::Always => true,
        ReflectionPolicy::IfNotPresent => !transition.reference().has_digest(),
        ReflectionPolicy::Never => false,
    }
}

/// Apply `policy` to a transition, calling `fetch` only when a digest is
/// required.
pub fn reflect<F>(
    transition: ReferenceTransition,
    policy: ReflectionPolicy,
    fetch: F,
) -> Result<ImageRef, DigestError>
where
    F: FnOnce() -> Result<String, DigestError>,
{
    let fetch_needed = needs_digest(&transition, policy);
    let changed = transition.is_changed();
    let reference = transition.into_reference();

    let next = if policy == ReflectionPolicy::Never {
        reference.without_digest()
    } else if fetch_needed {
        let digest = fetch()?;
        reference.with_digest(digest)
    } else {
        reference
    };

    debug!(
        reference = %next,
        %policy,
        changed,
        fetched = fetch_needed,
        "digest reflected"
    );
    Ok(next)
}

/// Advance from `previous` to the next persisted reference for `candidate`.
pub fn advance<F>(
    candidate: ImageRef,
    previous: Option<&ImageRef>,
    policy: ReflectionPolicy,
    fetch: F,
) -> Result<ImageRef, DigestError>
where
    F: FnOnce() -> Result<String, DigestError>,
{
    reflect(ReferenceTransition::between(candidate, previous), policy, fetch)
}
