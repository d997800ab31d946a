use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde::Deserialize;
use tracing::debug;

use tagpolicy_engine::{
    validate_spec, Disposition, Evaluation, InMemoryTagSource, PolicyEvaluator,
    StaticDigestResolver,
};
use tagpolicy_policy::OrderDefaults;
use tagpolicy_types::{ImagePolicySpec, PolicyStatus, Tag};

use crate::cli::*;

/// A scan of one image: its tags and, optionally, the digest of each tag.
#[derive(Debug, Default, Deserialize)]
pub struct TagSnapshot {
    pub tags: Vec<TagEntry>,
    #[serde(default)]
    pub digests: BTreeMap<String, String>,
}

/// A tag given either as a bare name or as a full object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TagEntry {
    Name(String),
    Full(Tag),
}

impl From<TagEntry> for Tag {
    fn from(entry: TagEntry) -> Self {
        match entry {
            TagEntry::Name(name) => Tag::new(name),
            TagEntry::Full(tag) => tag,
        }
    }
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Evaluate(args) => cmd_evaluate(args, &cli.format),
        Command::Check(args) => cmd_check(args, &cli.format),
    }
}

fn cmd_evaluate(args: EvaluateArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let spec = load_spec(&args.policy)?;
    let snapshot = load_snapshot(&args.tags)?;
    let status = match &args.status {
        Some(path) => load_status(path)?,
        None => PolicyStatus::empty(),
    };

    let evaluator = evaluator_for(&spec.image, snapshot)?;
    let out = match evaluator.evaluate(&spec, &status) {
        Ok(out) => out,
        Err(e) => {
            let hint = match e.disposition() {
                Disposition::Stall => "fix the policy and try again",
                Disposition::DependencyNotReady => "no tags have been observed for this image yet",
                Disposition::Retry => "retry once the tag source or registry recovers",
            };
            eprintln!("{} {}", "✗".red().bold(), e);
            eprintln!("  {}", hint.dimmed());
            return Err(e).context(format!("evaluation of '{}' failed", spec.image));
        }
    };

    if args.write_status {
        if let Some(path) = &args.status {
            save_status(path, &out.status)?;
        }
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&out)?),
        OutputFormat::Text => print_evaluation(&out),
    }
    Ok(())
}

fn cmd_check(args: CheckArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let spec = load_spec(&args.policy)?;
    let policy = validate_spec(&spec, &OrderDefaults::default())
        .with_context(|| format!("invalid policy in {}", args.policy.display()))?;

    match format {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "image": spec.image,
                "policy": policy.to_string(),
                "filtered": spec.filter_tags.is_some(),
                "digestReflectionPolicy": spec.reflection_policy().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            println!("{} Policy for {} is valid", "✓".green().bold(), spec.image.bold());
            println!("  Policy: {}", policy.to_string().cyan());
            if let Some(filter) = &spec.filter_tags {
                println!("  Filter: {}", filter.pattern.yellow());
            }
            println!("  Digest reflection: {}", spec.reflection_policy());
        }
    }
    Ok(())
}

fn print_evaluation(out: &Evaluation) {
    println!("{} {}", "✓".green().bold(), out.message);
    println!("  Reference: {}", out.reference.to_string().yellow());
    if let Some(digest) = &out.reference.digest {
        let note = if out.digest_refreshed { "fetched" } else { "kept" };
        println!("  Digest: {} ({})", digest.cyan(), note);
    }
    if out.changed {
        println!("  Changed: {}", "yes".green());
    } else {
        println!("  Changed: {}", "no".dimmed());
    }
}

fn evaluator_for(
    image: &str,
    snapshot: TagSnapshot,
) -> anyhow::Result<PolicyEvaluator<InMemoryTagSource, StaticDigestResolver>> {
    let source = InMemoryTagSource::new();
    let tags: Vec<Tag> = snapshot.tags.into_iter().map(Tag::from).collect();
    debug!(image, tags = tags.len(), digests = snapshot.digests.len(), "loaded tag snapshot");
    source.set_tags(image, tags)?;

    let digests = StaticDigestResolver::new();
    for (tag, digest) in &snapshot.digests {
        digests.insert(image, tag, digest)?;
    }
    Ok(PolicyEvaluator::new(source, digests))
}

pub fn load_spec(path: &Path) -> anyhow::Result<ImagePolicySpec> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read policy {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse policy {}", path.display()))
}

pub fn load_snapshot(path: &Path) -> anyhow::Result<TagSnapshot> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read tags {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse tags {}", path.display()))
}

/// Load a persisted status. A missing file is the status of an image that
/// has never been evaluated.
pub fn load_status(path: &Path) -> anyhow::Result<PolicyStatus> {
    if !path.exists() {
        return Ok(PolicyStatus::empty());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read status {}", path.display()))?;
    if text.trim().is_empty() {
        return Ok(PolicyStatus::empty());
    }
    serde_json::from_str(&text).with_context(|| format!("failed to parse status {}", path.display()))
}

pub fn save_status(path: &Path, status: &PolicyStatus) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(status)?;
    fs::write(path, json).with_context(|| format!("failed to write status {}", path.display()))
}
