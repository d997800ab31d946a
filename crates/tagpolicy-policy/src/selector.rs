//! Build an ordering [`Policy`] from a [`PolicyChoice`].

use tagpolicy_types::PolicyChoice;

use crate::error::{PolicyError, Result};
use crate::order::OrderDefaults;
use crate::policies::{Alphabetical, Newest, Numerical, Policy, SemVer};

/// Construct the policy named by `choice` using the standard order defaults.
pub fn policy_from_choice(choice: &PolicyChoice) -> Result<Policy> {
    policy_from_choice_with(choice, &OrderDefaults::default())
}

/// Construct the policy named by `choice`.
///
/// Exactly one arm must be populated. Any construction error of the chosen
/// policy (bad range, bad order) is reported as
/// [`PolicyError::InvalidPolicy`].
pub fn policy_from_choice_with(choice: &PolicyChoice, defaults: &OrderDefaults) -> Result<Policy> {
    match choice.populated() {
        0 => return Err(PolicyError::InvalidPolicy("no policy provided".into())),
        1 => {}
        n => {
            return Err(PolicyError::InvalidPolicy(format!(
                "exactly one policy must be provided, found {n}"
            )))
        }
    }

    let built = if let Some(p) = &choice.semver {
        SemVer::new(&p.range).map(Policy::SemVer)
    } else if let Some(p) = &choice.alphabetical {
        Alphabetical::with_default(&p.order, defaults.alphabetical).map(Policy::Alphabetical)
    } else if let Some(p) = &choice.numerical {
        Numerical::with_default(&p.order, defaults.numerical).map(Policy::Numerical)
    } else if let Some(p) = &choice.newest {
        Newest::with_default(&p.order, defaults.newest).map(Policy::Newest)
    } else {
        Err(PolicyError::InvalidPolicy("no policy provided".into()))
    };

    built.map_err(|e| match e {
        PolicyError::InvalidPolicy(_) => e,
        other => PolicyError::InvalidPolicy(other.to_string()),
    })
}
