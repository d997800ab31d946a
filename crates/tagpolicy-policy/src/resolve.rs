//! The resolution pipeline: filter, order, map back.

use tracing::debug;

use tagpolicy_types::{PolicyChoice, Tag, TagFilterSpec};

use crate::error::{PolicyError, Result};
use crate::filter::apply_filter;
use crate::policies::{Policer, Policy};
use crate::selector::policy_from_choice;

/// Resolve the latest tag for one evaluation pass.
///
/// 1. An empty `tags` list fails with [`PolicyError::NoTagsAvailable`].
/// 2. The policy is built from `choice`.
/// 3. With a filter, the policy evaluates the extracted names and the winner
///    is mapped back to its original tag. A filter that matches nothing
///    surfaces the policy's [`PolicyError::EmptyInput`].
/// 4. Without a filter, the policy evaluates `tags` directly.
pub fn resolve(tags: &[Tag], filter: Option<&TagFilterSpec>, choice: &PolicyChoice) -> Result<Tag> {
    if tags.is_empty() {
        return Err(PolicyError::NoTagsAvailable);
    }
    let policy = policy_from_choice(choice)?;
    resolve_with(&policy, tags, filter)
}

/// Like [`resolve`], with an already constructed policy.
pub fn resolve_with(policy: &Policy, tags: &[Tag], filter: Option<&TagFilterSpec>) -> Result<Tag> {
    if tags.is_empty() {
        return Err(PolicyError::NoTagsAvailable);
    }

    let latest = match filter {
        Some(spec) => {
            let view = apply_filter(tags, spec)?;
            let winner = policy.latest(&view.items())?;
            // The winner's name always comes from the view.
            view.original(&winner.name)
                .cloned()
                .ok_or(PolicyError::EmptyInput)?
        }
        None => policy.latest(tags)?,
    };

    debug!(
        policy = %policy,
        tags = tags.len(),
        filtered = filter.is_some(),
        latest = %latest.name,
        "resolved latest tag"
    );
    Ok(latest)
}
