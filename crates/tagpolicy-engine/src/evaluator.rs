//! One evaluation pass: validate the policy, resolve the latest tag, reflect
//! its digest, and derive the next status.

use serde::Serialize;
use tracing::{debug, info};

use tagpolicy_policy::{policy_from_choice_with, resolve_with, OrderDefaults, Policy, RegexFilter};
use tagpolicy_types::{validate_image_name, ImagePolicySpec, ImageRef, PolicyStatus, Tag};

use crate::digest::DigestResolver;
use crate::error::Result;
use crate::reflect::{needs_digest, reflect, ReferenceTransition};
use crate::source::TagSource;

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// The outcome of one successful evaluation pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    /// The winning tag, as observed by the tag source.
    pub latest: Tag,
    /// The reference to persist, digest reflected per policy.
    pub reference: ImageRef,
    /// The status the caller should persist in place of the old one.
    pub status: PolicyStatus,
    /// `true` if the selected `(image, tag)` differs from the previous one.
    pub changed: bool,
    /// `true` if the digest resolver was consulted in this pass.
    pub digest_refreshed: bool,
    /// Human readable summary of the result.
    pub message: String,
}

/// Ready message for a resolved tag.
///
/// Mentions the previous tag only when there is one and it differs from
/// `latest_tag`.
pub fn compose_ready_message(previous_tag: Option<&str>, latest_tag: &str, image: &str) -> String {
    match previous_tag {
        Some(prev) if !prev.is_empty() && prev != latest_tag => {
            format!("Latest image tag for '{image}' updated from {prev} to {latest_tag}")
        }
        _ => format!("Latest image tag for '{image}' resolved to {latest_tag}"),
    }
}

/// Check that `spec` can be evaluated at all: the image name is bare, exactly
/// one policy is configured and builds, and the filter pattern compiles.
///
/// Returns the constructed policy.
pub fn validate_spec(spec: &ImagePolicySpec, defaults: &OrderDefaults) -> Result<Policy> {
    validate_image_name(&spec.image)?;
    let policy = policy_from_choice_with(&spec.policy, defaults)?;
    if let Some(filter) = &spec.filter_tags {
        RegexFilter::from_spec(filter)?;
    }
    Ok(policy)
}

// ---------------------------------------------------------------------------
// PolicyEvaluator
// ---------------------------------------------------------------------------

/// Runs evaluation passes for image policies against a tag source and a
/// digest resolver.
///
/// An evaluation never mutates the status it is given. On success the
/// returned [`Evaluation`] carries the status to persist next; on failure the
/// caller keeps the old one.
pub struct PolicyEvaluator<S, D> {
    source: S,
    digests: D,
    defaults: OrderDefaults,
}

impl<S: TagSource, D: DigestResolver> PolicyEvaluator<S, D> {
    /// Create an evaluator with the standard order defaults.
    pub fn new(source: S, digests: D) -> Self {
        Self {
            source,
            digests,
            defaults: OrderDefaults::default(),
        }
    }

    /// Replace the order defaults used when a policy leaves `order` empty.
    pub fn with_order_defaults(mut self, defaults: OrderDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn digests(&self) -> &D {
        &self.digests
    }

    /// Evaluate `spec` against the current tags, starting from `status`.
    ///
    /// Configuration problems are reported before the tag source is read.
    pub fn evaluate(&self, spec: &ImagePolicySpec, status: &PolicyStatus) -> Result<Evaluation> {
        let policy = validate_spec(spec, &self.defaults)?;
        let tags = self.source.tags(&spec.image)?;
        let latest = resolve_with(&policy, &tags, spec.filter_tags.as_ref())?;

        let candidate = ImageRef::new(spec.image.as_str(), latest.name.as_str());
        let transition = ReferenceTransition::between(candidate, status.latest_ref.as_ref());
        let changed = transition.is_changed();
        let mode = spec.reflection_policy();
        let digest_refreshed = needs_digest(&transition, mode);

        let target = transition.reference().clone();
        let reference = reflect(transition, mode, || self.digests.resolve_digest(&target))?;

        let mut next = status.clone();
        if changed {
            next.observed_previous_ref = status.latest_ref.clone();
        }
        next.latest_ref = Some(reference.clone());

        let message = compose_ready_message(next.previous_tag(), &latest.name, &spec.image);
        if changed {
            info!(
                image = %spec.image,
                tag = %latest.name,
                previous = next.previous_tag().unwrap_or(""),
                policy = policy.kind(),
                "latest image tag changed"
            );
        } else {
            debug!(
                image = %spec.image,
                tag = %latest.name,
                digest = reference.digest.as_deref().unwrap_or(""),
                "latest image tag unchanged"
            );
        }

        Ok(Evaluation {
            latest,
            reference,
            status: next,
            changed,
            digest_refreshed,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use tagpolicy_policy::{OrderDirection, PolicyError};
    use tagpolicy_types::{PolicyChoice, ReflectionPolicy, TagFilterSpec, TypeError};

    use crate::digest::StaticDigestResolver;
    use crate::error::{DigestError, Disposition, EngineError};
    use crate::source::InMemoryTagSource;

    const IMAGE: &str = "ghcr.io/org/app";

    fn evaluator(tags: &[&str]) -> PolicyEvaluator<InMemoryTagSource, StaticDigestResolver> {
        let source = InMemoryTagSource::new();
        source
            .set_tags(IMAGE, tags.iter().map(|t| Tag::new(*t)).collect())
            .unwrap();
        PolicyEvaluator::new(source, StaticDigestResolver::new())
    }

    fn spec(choice: PolicyChoice) -> ImagePolicySpec {
        ImagePolicySpec::new(IMAGE, choice)
    }

    #[test]
    fn ready_messages() {
        assert_eq!(
            compose_ready_message(None, "1.0.0", "foo/bar"),
            "Latest image tag for 'foo/bar' resolved to 1.0.0"
        );
        assert_eq!(
            compose_ready_message(Some("1.0.0"), "1.1.0", "foo/bar"),
            "Latest image tag for 'foo/bar' updated from 1.0.0 to 1.1.0"
        );
        assert_eq!(
            compose_ready_message(Some("1.0.0"), "1.0.0", "foo/bar"),
            "Latest image tag for 'foo/bar' resolved to 1.0.0"
        );
        assert_eq!(
            compose_ready_message(Some(""), "1.0.0", "foo/bar"),
            "Latest image tag for 'foo/bar' resolved to 1.0.0"
        );
    }

    #[test]
    fn first_evaluation() {
        let eval = evaluator(&["1.0.0", "2.0.0", "1.0.1", "1.2.0"]);
        let out = eval
            .evaluate(&spec(PolicyChoice::semver("1.0.x")), &PolicyStatus::empty())
            .unwrap();

        assert_eq!(out.latest, Tag::new("1.0.1"));
        assert_eq!(out.reference, ImageRef::new(IMAGE, "1.0.1"));
        assert!(out.changed);
        assert!(!out.digest_refreshed);
        assert_eq!(out.status.latest_ref, Some(ImageRef::new(IMAGE, "1.0.1")));
        assert_eq!(out.status.observed_previous_ref, None);
        assert_eq!(
            out.message,
            "Latest image tag for 'ghcr.io/org/app' resolved to 1.0.1"
        );
    }

    #[test]
    fn tag_update_records_previous() {
        let eval = evaluator(&["1.0.0"]);
        let s = spec(PolicyChoice::semver(">=1.0.0"));
        let first = eval.evaluate(&s, &PolicyStatus::empty()).unwrap();

        eval.source()
            .set_tags(IMAGE, vec![Tag::new("1.0.0"), Tag::new("1.1.0")])
            .unwrap();
        let second = eval.evaluate(&s, &first.status).unwrap();

        assert!(second.changed);
        assert_eq!(second.status.observed_previous_ref, Some(ImageRef::new(IMAGE, "1.0.0")));
        assert_eq!(
            second.message,
            "Latest image tag for 'ghcr.io/org/app' updated from 1.0.0 to 1.1.0"
        );

        // A further pass with the same tags keeps the recorded previous.
        let third = eval.evaluate(&s, &second.status).unwrap();
        assert!(!third.changed);
        assert_eq!(third.status, second.status);
    }

    #[test]
    fn caller_status_is_not_mutated() {
        let eval = evaluator(&["1.0.0"]);
        let status = PolicyStatus {
            latest_ref: Some(ImageRef::new(IMAGE, "0.9.0")),
            observed_previous_ref: None,
        };
        let snapshot = status.clone();
        let out = eval
            .evaluate(&spec(PolicyChoice::semver(">=1.0.0")), &status)
            .unwrap();
        assert_eq!(status, snapshot);
        assert_eq!(out.status.observed_previous_ref, snapshot.latest_ref);
    }

    #[test]
    fn digest_reflection_if_not_present() {
        let eval = evaluator(&["v1"]);
        eval.digests().insert(IMAGE, "v1", "sha256:aaa").unwrap();
        let mut s = spec(PolicyChoice::alphabetical(""));
        s.digest_reflection_policy = Some(ReflectionPolicy::IfNotPresent);

        let first = eval.evaluate(&s, &PolicyStatus::empty()).unwrap();
        assert!(first.digest_refreshed);
        assert_eq!(first.reference.digest.as_deref(), Some("sha256:aaa"));

        // The registry moves the tag; IfNotPresent keeps the pinned digest.
        eval.digests().insert(IMAGE, "v1", "sha256:bbb").unwrap();
        let second = eval.evaluate(&s, &first.status).unwrap();
        assert!(!second.digest_refreshed);
        assert_eq!(second.reference.digest.as_deref(), Some("sha256:aaa"));

        // A new tag is always looked up afresh.
        eval.source()
            .set_tags(IMAGE, vec![Tag::new("v1"), Tag::new("v2")])
            .unwrap();
        eval.digests().insert(IMAGE, "v2", "sha256:ccc").unwrap();
        let third = eval.evaluate(&s, &second.status).unwrap();
        assert_eq!(third.reference.tag, "v2");
        assert_eq!(third.reference.digest.as_deref(), Some("sha256:ccc"));
    }

    #[test]
    fn digest_reflection_always_and_never() {
        let eval = evaluator(&["v1"]);
        eval.digests().insert(IMAGE, "v1", "sha256:aaa").unwrap();
        let mut s = spec(PolicyChoice::alphabetical(""));

        s.digest_reflection_policy = Some(ReflectionPolicy::Always);
        let first = eval.evaluate(&s, &PolicyStatus::empty()).unwrap();
        eval.digests().insert(IMAGE, "v1", "sha256:bbb").unwrap();
        let second = eval.evaluate(&s, &first.status).unwrap();
        assert_eq!(second.reference.digest.as_deref(), Some("sha256:bbb"));

        s.digest_reflection_policy = None;
        let third = eval.evaluate(&s, &second.status).unwrap();
        assert_eq!(third.reference.digest, None);
        assert!(!third.digest_refreshed);
    }

    #[test]
    fn missing_digest_fails_without_status() {
        let eval = evaluator(&["v1"]);
        let mut s = spec(PolicyChoice::alphabetical(""));
        s.digest_reflection_policy = Some(ReflectionPolicy::Always);

        let err = eval.evaluate(&s, &PolicyStatus::empty()).unwrap_err();
        assert!(matches!(err, EngineError::Digest(DigestError::NotFound { .. })));
        assert_eq!(err.disposition(), Disposition::Retry);
    }

    #[test]
    fn filter_and_newest() {
        let source = InMemoryTagSource::new();
        let t = |s| Utc.timestamp_opt(s, 0).unwrap();
        source
            .set_tags(
                IMAGE,
                vec![
                    Tag::with_created("main-a1", t(100)),
                    Tag::with_created("main-b2", t(300)),
                    Tag::with_created("pr-9", t(900)),
                ],
            )
            .unwrap();
        let eval = PolicyEvaluator::new(source, StaticDigestResolver::new());

        let mut s = spec(PolicyChoice::newest(""));
        s.filter_tags = Some(TagFilterSpec::new(r"^main-(\w+)$", "$1"));
        let out = eval.evaluate(&s, &PolicyStatus::empty()).unwrap();
        assert_eq!(out.latest.name, "main-b2");
        assert_eq!(out.reference.tag, "main-b2");
    }

    #[test]
    fn order_defaults_are_applied() {
        let eval = evaluator(&["a", "z"]).with_order_defaults(OrderDefaults {
            alphabetical: OrderDirection::Descending,
            ..OrderDefaults::default()
        });
        let out = eval
            .evaluate(&spec(PolicyChoice::alphabetical("")), &PolicyStatus::empty())
            .unwrap();
        assert_eq!(out.latest.name, "a");
    }

    #[test]
    fn invalid_image_stalls() {
        let eval = evaluator(&["v1"]);
        let s = ImagePolicySpec::new("https://ghcr.io/org/app", PolicyChoice::alphabetical(""));
        let err = eval.evaluate(&s, &PolicyStatus::empty()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidImage(TypeError::InvalidImage { .. })));
        assert_eq!(err.disposition(), Disposition::Stall);
    }

    #[test]
    fn configuration_errors_precede_missing_tags() {
        let eval = evaluator(&[]);
        let err = eval
            .evaluate(&spec(PolicyChoice::default()), &PolicyStatus::empty())
            .unwrap_err();
        assert!(matches!(err, EngineError::Policy(PolicyError::InvalidPolicy(_))));
        assert_eq!(err.disposition(), Disposition::Stall);

        let mut s = spec(PolicyChoice::alphabetical(""));
        s.filter_tags = Some(TagFilterSpec::new("([", ""));
        let err = eval.evaluate(&s, &PolicyStatus::empty()).unwrap_err();
        assert!(matches!(err, EngineError::Policy(PolicyError::InvalidPattern { .. })));
    }

    #[test]
    fn no_tags_is_dependency_not_ready() {
        let eval = evaluator(&[]);
        let err = eval
            .evaluate(&spec(PolicyChoice::semver("1.0.x")), &PolicyStatus::empty())
            .unwrap_err();
        assert_eq!(err, EngineError::Policy(PolicyError::NoTagsAvailable));
        assert_eq!(err.disposition(), Disposition::DependencyNotReady);
    }

    #[test]
    fn no_matching_version() {
        let eval = evaluator(&["1.0.0", "1.1.0"]);
        let err = eval
            .evaluate(&spec(PolicyChoice::semver(">=2.0.0")), &PolicyStatus::empty())
            .unwrap_err();
        assert!(matches!(err, EngineError::Policy(PolicyError::NoMatchingVersion { .. })));
    }

    #[test]
    fn evaluation_serializes_camel_case() {
        let eval = evaluator(&["v1"]);
        let out = eval
            .evaluate(&spec(PolicyChoice::alphabetical("")), &PolicyStatus::empty())
            .unwrap();
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["reference"]["image"], IMAGE);
        assert_eq!(json["status"]["latestRef"]["tag"], "v1");
        assert_eq!(json["digestRefreshed"], false);
    }
}
