//! Semantic version range policy.
//!
//! Range syntax accepted by [`SemVer::new`]:
//!
//! - comparators separated by `,` or whitespace, all of which must hold
//! - alternatives separated by `||`, any of which may hold
//! - operators `=`, `!=`, `>`, `>=`, `=>`, `<`, `<=`, `=<`, `~`, `~>`, `^`,
//!   optionally followed by whitespace (`>= 1.0`)
//! - wildcards `x`, `X`, `*` in place of a version field (`1.0.x`)
//! - hyphen ranges `1.2 - 1.4` meaning `>=1.2, <=1.4`
//! - a `v` prefix on any version (`v1.0.x`, `>=v1.2`)
//!
//! A version without an operator pins the fields it names: `1.0` matches any
//! `1.0.z`, `1.0.3` matches only `1.0.3`. `!=` excludes what the same version
//! would pin, so `!=1.2` excludes every `1.2.z`.
//!
//! Tag names are parsed leniently: an optional `v` prefix, and missing minor
//! or patch fields count as zero (`v2` is `2.0.0`). Tags that do not parse
//! are skipped.

use std::cmp::Ordering;

use semver::{Version, VersionReq};
use tracing::debug;

use tagpolicy_types::Tag;

use crate::error::{PolicyError, Result};
use crate::order::OrderDirection;
use crate::policies::{select_extreme, Policer};

const OPERATOR_CHARS: &[char] = &['=', '!', '<', '>', '~', '^'];

/// Semantic version policy: the highest version satisfying a range wins.
#[derive(Clone, Debug)]
pub struct SemVer {
    range: String,
    alternatives: Vec<Alternative>,
}

/// One `||` alternative: the comparators that must hold, and the versions
/// excluded by `!=`.
#[derive(Clone, Debug)]
struct Alternative {
    req: VersionReq,
    excluded: Vec<VersionReq>,
}

impl Alternative {
    fn matches(&self, version: &Version) -> bool {
        self.req.matches(version) && !self.excluded.iter().any(|x| x.matches(version))
    }
}

impl SemVer {
    /// Parse a range expression.
    pub fn new(range: &str) -> Result<Self> {
        let invalid = |reason: String| PolicyError::InvalidRange {
            range: range.to_string(),
            reason,
        };
        let parse = |req: &str| VersionReq::parse(req).map_err(|e| invalid(e.to_string()));

        let alternatives = range
            .split("||")
            .map(|alt| -> Result<Alternative> {
                let (required, excluded) = normalize_alternative(alt).map_err(invalid)?;
                let req = if required.is_empty() {
                    VersionReq::STAR
                } else {
                    parse(required.join(", ").as_str())?
                };
                let excluded = excluded
                    .iter()
                    .map(|v| parse(v.as_str()))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Alternative { req, excluded })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            range: range.to_string(),
            alternatives,
        })
    }

    /// The range expression as given.
    pub fn range(&self) -> &str {
        &self.range
    }

    /// Returns `true` if `version` satisfies any alternative of the range.
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|alt| alt.matches(version))
    }
}

impl Policer for SemVer {
    fn latest(&self, tags: &[Tag]) -> Result<Tag> {
        if tags.is_empty() {
            return Err(PolicyError::EmptyInput);
        }

        let candidates = tags.iter().filter_map(|tag| {
            let version = parse_version(&tag.name)?;
            self.matches(&version).then_some((version, tag))
        });

        match select_extreme(candidates, OrderDirection::Ascending, |a, b| {
            cmp_precedence(&a.0, &b.0)
        }) {
            Some((version, tag)) => {
                debug!(range = %self.range, %version, tag = %tag.name, "semver range resolved");
                Ok(tag.clone())
            }
            None => Err(PolicyError::NoMatchingVersion {
                range: self.range.clone(),
            }),
        }
    }
}

/// Parse a tag name as a version, tolerating a `v` prefix and missing minor
/// or patch fields.
pub fn parse_version(name: &str) -> Option<Version> {
    let trimmed = name.strip_prefix(['v', 'V']).unwrap_or(name);
    let core_end = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, suffix) = trimmed.split_at(core_end);

    let padded = match core.matches('.').count() {
        0 => format!("{core}.0.0{suffix}"),
        1 => format!("{core}.0{suffix}"),
        _ => trimmed.to_string(),
    };
    Version::parse(&padded).ok()
}

/// Semver precedence: major, minor, patch, then pre-release. Build metadata
/// does not participate.
fn cmp_precedence(a: &Version, b: &Version) -> Ordering {
    a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.patch.cmp(&b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
}

/// A single comparator after normalisation.
#[derive(Debug, PartialEq, Eq)]
enum Comparator {
    /// Must hold, in [`VersionReq::parse`] syntax.
    Require(String),
    /// Versions matching this requirement are excluded.
    Exclude(String),
}

/// Rewrite one `||` alternative into the comma-separated comparators
/// understood by [`VersionReq::parse`], plus the `!=` exclusions.
fn normalize_alternative(alt: &str) -> std::result::Result<(Vec<String>, Vec<String>), String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut pending_op: Option<&str> = None;

    for raw in alt
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        if raw.chars().all(|c| OPERATOR_CHARS.contains(&c)) {
            if let Some(op) = pending_op {
                return Err(format!("operator '{op}' is missing a version"));
            }
            pending_op = Some(raw);
            continue;
        }
        match pending_op.take() {
            Some(op) => tokens.push(format!("{op}{raw}")),
            None => tokens.push(raw.to_string()),
        }
    }

    if let Some(op) = pending_op {
        return Err(format!("operator '{op}' is missing a version"));
    }
    if tokens.is_empty() {
        return Err("empty range".into());
    }

    let mut required = Vec::with_capacity(tokens.len());
    let mut excluded = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens.get(i + 1).is_some_and(|t| t == "-") {
            let Some(upper) = tokens.get(i + 2) else {
                return Err(format!("hyphen range '{} -' is missing an upper bound", tokens[i]));
            };
            required.push(format!(">={}", strip_v(&tokens[i])));
            required.push(format!("<={}", strip_v(upper)));
            i += 3;
            continue;
        }
        match normalize_comparator(&tokens[i])? {
            Comparator::Require(c) => required.push(c),
            Comparator::Exclude(c) => excluded.push(c),
        }
        i += 1;
    }

    Ok((required, excluded))
}

fn normalize_comparator(token: &str) -> std::result::Result<Comparator, String> {
    let version_start = token
        .find(|c: char| !OPERATOR_CHARS.contains(&c))
        .unwrap_or(token.len());
    let (op, version) = token.split_at(version_start);
    let version = strip_v(version);

    let comparator = match op {
        "" => Comparator::Require(pin(version)),
        "!=" => Comparator::Exclude(pin(version)),
        "=>" => Comparator::Require(format!(">={version}")),
        "=<" => Comparator::Require(format!("<={version}")),
        "~>" => Comparator::Require(format!("~{version}")),
        "=" | ">" | ">=" | "<" | "<=" | "~" | "^" => Comparator::Require(format!("{op}{version}")),
        other => return Err(format!("unknown operator '{other}'")),
    };
    Ok(comparator)
}

/// A bare version as a requirement on the fields it names.
fn pin(version: &str) -> String {
    let has_wildcard = version
        .split('.')
        .any(|part| matches!(part, "x" | "X" | "*"));
    if has_wildcard {
        version.to_string()
    } else {
        format!("={version}")
    }
}

fn strip_v(version: &str) -> &str {
    version.strip_prefix(['v', 'V']).unwrap_or(version)
}
