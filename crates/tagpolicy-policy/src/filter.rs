//! Regex tag filter with optional capture extraction.
//!
//! The filter keeps only tags whose name matches a pattern. With an extract
//! template, each match is rewritten from its capture groups (`$1`,
//! `${name}`) and the rewritten name is what the ordering policy sees. The
//! resulting [`FilteredView`] remembers which original tag each extracted
//! name came from.
//!
//! # Extraction collisions
//!
//! Two originals may extract to the same name. The view keeps the last one
//! in input order. Callers that care should make the extract template
//! injective over their tag set.

use std::collections::BTreeMap;

use regex::Regex;
use tracing::{debug, warn};

use tagpolicy_types::{Tag, TagFilterSpec};

use crate::error::{PolicyError, Result};

/// A compiled tag filter.
#[derive(Clone, Debug)]
pub struct RegexFilter {
    regex: Regex,
    extract: String,
}

impl RegexFilter {
    /// Compile a filter. An empty `extract` keeps tag names unchanged.
    pub fn new(pattern: &str, extract: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| PolicyError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            regex,
            extract: extract.to_string(),
        })
    }

    /// Compile a filter from its configuration.
    pub fn from_spec(spec: &TagFilterSpec) -> Result<Self> {
        Self::new(&spec.pattern, &spec.extract)
    }

    /// The source pattern.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Apply the filter, producing a view over the matching tags.
    ///
    /// Groups referenced by the template but absent from the pattern expand
    /// to the empty string.
    pub fn apply(&self, tags: &[Tag]) -> FilteredView {
        let mut entries: BTreeMap<String, Tag> = BTreeMap::new();

        for tag in tags {
            let Some(caps) = self.regex.captures(&tag.name) else {
                continue;
            };

            let extracted = if self.extract.is_empty() {
                tag.name.clone()
            } else {
                let mut dst = String::new();
                caps.expand(&self.extract, &mut dst);
                dst
            };

            if let Some(replaced) = entries.insert(extracted.clone(), tag.clone()) {
                if replaced.name != tag.name {
                    warn!(
                        extracted = %extracted,
                        replaced = %replaced.name,
                        kept = %tag.name,
                        "tag filter extracted the same name from distinct tags"
                    );
                }
            }
        }

        debug!(
            pattern = %self.regex.as_str(),
            input = tags.len(),
            matched = entries.len(),
            "tag filter applied"
        );

        FilteredView { entries }
    }
}

/// Compile `spec` and apply it to `tags` in one step.
pub fn apply_filter(tags: &[Tag], spec: &TagFilterSpec) -> Result<FilteredView> {
    Ok(RegexFilter::from_spec(spec)?.apply(tags))
}

/// Tags that passed a filter, keyed by extracted name.
///
/// Iteration is ordered by extracted name so evaluation does not depend on
/// the order the tag source listed them in. A policy that keeps the first of
/// equal candidates therefore breaks ties among extracted names by their
/// sorted order, not by input order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilteredView {
    entries: BTreeMap<String, Tag>,
}

impl FilteredView {
    /// Number of distinct extracted names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no tag matched.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The tags to evaluate: extracted names carrying the creation time of
    /// their original tag.
    pub fn items(&self) -> Vec<Tag> {
        self.entries
            .iter()
            .map(|(name, original)| original.renamed(name.as_str()))
            .collect()
    }

    /// Reverse lookup from an extracted name to the original tag.
    pub fn original(&self, extracted: &str) -> Option<&Tag> {
        self.entries.get(extracted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(names: &[&str]) -> Vec<Tag> {
        names.iter().map(|n| Tag::new(*n)).collect()
    }

    fn item_names(view: &FilteredView) -> Vec<String> {
        view.items().into_iter().map(|t| t.name).collect()
    }

    #[test]
    fn empty_pattern_keeps_everything() {
        let f = RegexFilter::new("", "").unwrap();
        assert_eq!(item_names(&f.apply(&tags(&["a"]))), vec!["a"]);
    }

    #[test]
    fn pattern_drops_non_matching() {
        let f = RegexFilter::new("^ver", "").unwrap();
        let view = f.apply(&tags(&["ver1", "ver2", "ver3", "rel1"]));
        assert_eq!(item_names(&view), vec!["ver1", "ver2", "ver3"]);
        assert!(view.original("rel1").is_none());
    }

    #[test]
    fn numbered_capture_group() {
        let f = RegexFilter::new(r"ver(\d+)", "$1").unwrap();
        let view = f.apply(&tags(&["ver1", "ver2", "ver3", "rel1"]));
        assert_eq!(item_names(&view), vec!["1", "2", "3"]);
        assert_eq!(view.original("2").unwrap().name, "ver2");
    }

    #[test]
    fn anchored_group_without_extract() {
        let f = RegexFilter::new(r"^(123-[0-9]+\.[0-9]+\.[a-z0-9]+-debug)", "").unwrap();
        let view = f.apply(&tags(&[
            "123-123.123.abcd123-debug",
            "123-123.123.abcd123",
            "123-123.123.abcd456-debug",
            "123-123.123.abcd456",
        ]));
        assert_eq!(
            item_names(&view),
            vec!["123-123.123.abcd123-debug", "123-123.123.abcd456-debug"]
        );
    }

    #[test]
    fn named_group_with_negated_class() {
        let f = RegexFilter::new(
            r"^(?P<tag>123-[0-9]+\.[0-9]+\.[a-z0-9]+[^-debug])",
            "$tag",
        )
        .unwrap();
        let view = f.apply(&tags(&[
            "123-123.123.abcd123-debug",
            "123-123.123.abcd123",
            "123-123.123.abcd456-debug",
            "123-123.123.abcd456",
        ]));
        assert_eq!(
            item_names(&view),
            vec!["123-123.123.abcd123", "123-123.123.abcd456"]
        );
    }

    #[test]
    fn named_group_anchored_at_end() {
        let f = RegexFilter::new(r"^(?P<tag>123-[0-9]+\.[0-9]+\.[a-z0-9]+$)", "$tag").unwrap();
        let view = f.apply(&tags(&[
            "123-123.123.abcd123-debug",
            "123-123.123.abcd123",
            "123-123.123.abcd456-debug",
            "123-123.123.abcd456",
        ]));
        assert_eq!(
            item_names(&view),
            vec!["123-123.123.abcd123", "123-123.123.abcd456"]
        );
        assert_eq!(
            view.original("123-123.123.abcd456").unwrap().name,
            "123-123.123.abcd456"
        );
    }

    #[test]
    fn collision_keeps_last_original() {
        let f = RegexFilter::new(r"^(?:rc|rel)-(\d+)$", "$1").unwrap();

        let view = f.apply(&tags(&["rc-7", "rel-7"]));
        assert_eq!(view.len(), 1);
        assert_eq!(view.original("7").unwrap().name, "rel-7");

        // Input order decides the winner of a collision.
        let view = f.apply(&tags(&["rel-7", "rc-7"]));
        assert_eq!(view.original("7").unwrap().name, "rc-7");
    }

    #[test]
    fn missing_group_expands_to_empty() {
        let f = RegexFilter::new(r"^v(\d+)$", "$2").unwrap();
        let view = f.apply(&tags(&["v1", "v2"]));
        // Both originals collapse onto "", the last one wins.
        assert_eq!(item_names(&view), vec![""]);
        assert_eq!(view.original("").unwrap().name, "v2");
    }

    #[test]
    fn items_keep_created() {
        use chrono::{TimeZone, Utc};
        let t = Utc.timestamp_opt(1_606_364_286, 0).unwrap();
        let f = RegexFilter::new(r"^rel-(\d+)$", "$1").unwrap();
        let view = f.apply(&[Tag::with_created("rel-1606364286", t)]);
        assert_eq!(view.items(), vec![Tag::with_created("1606364286", t)]);
    }

    #[test]
    fn empty_input_is_empty_view() {
        let view = apply_filter(&[], &TagFilterSpec::new("^v", "")).unwrap();
        assert!(view.is_empty());
        assert!(view.items().is_empty());
    }

    #[test]
    fn invalid_pattern() {
        let err = RegexFilter::new("^(unclosed", "").unwrap_err();
        assert!(matches!(err, PolicyError::InvalidPattern { ref pattern, .. } if pattern == "^(unclosed"));
        assert!(err.is_configuration());
    }
}
