//! Image name validation.
//!
//! A policy targets a bare image repository. Valid names:
//! - Must be non-empty and contain no whitespace
//! - Must not start with a URL scheme (`https://...`)
//! - Must not carry a tag (`app:1.0`) or a digest (`app@sha256:...`)
//! - Must not start or end with `/`, or contain empty path components
//! - Repository path components are lowercase alphanumerics separated by
//!   `.`, `_` or `-`
//!
//! The first component may be a registry host, which may include a port
//! (`localhost:5000/app`).

use crate::error::{Result, TypeError};

fn invalid(image: &str, reason: impl Into<String>) -> TypeError {
    TypeError::InvalidImage {
        image: image.to_string(),
        reason: reason.into(),
    }
}

/// Returns `true` if the component looks like a registry host rather than a
/// repository path segment.
fn is_registry_host(component: &str) -> bool {
    component.contains('.') || component.contains(':') || component == "localhost"
}

fn is_valid_path_component(component: &str) -> bool {
    let bytes = component.as_bytes();
    let is_alnum = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    match (bytes.first(), bytes.last()) {
        (Some(&first), Some(&last)) if is_alnum(first) && is_alnum(last) => bytes
            .iter()
            .all(|&b| is_alnum(b) || b == b'.' || b == b'_' || b == b'-'),
        _ => false,
    }
}

/// Validate a bare image name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use tagpolicy_types::names::validate_image_name;
///
/// assert!(validate_image_name("ghcr.io/org/app").is_ok());
/// assert!(validate_image_name("localhost:5000/app").is_ok());
/// assert!(validate_image_name("app:1.0").is_err());
/// assert!(validate_image_name("https://ghcr.io/org/app").is_err());
/// ```
pub fn validate_image_name(image: &str) -> Result<()> {
    if image.is_empty() {
        return Err(invalid(image, "image name must not be empty"));
    }

    if let Some((scheme, _)) = image.split_once("://") {
        return Err(invalid(
            image,
            format!("image should not start with URL scheme; remove '{scheme}://'"),
        ));
    }

    if image.chars().any(char::is_whitespace) {
        return Err(invalid(image, "image must not contain whitespace"));
    }

    if let Some((_, digest)) = image.split_once('@') {
        return Err(invalid(
            image,
            format!("image should not contain a digest; remove '@{digest}'"),
        ));
    }

    if image.starts_with('/') || image.ends_with('/') {
        return Err(invalid(image, "image must not start or end with '/'"));
    }

    let components: Vec<&str> = image.split('/').collect();
    if components.iter().any(|c| c.is_empty()) {
        return Err(invalid(image, "path components must not be empty"));
    }

    // A ':' in the last component is a tag, wherever the registry port is.
    if let Some(last) = components.last() {
        if let Some((_, tag)) = last.split_once(':') {
            return Err(invalid(
                image,
                format!("image should not contain a tag; remove ':{tag}'"),
            ));
        }
    }

    let path = if components.len() > 1 && is_registry_host(components[0]) {
        &components[1..]
    } else {
        &components[..]
    };

    for component in path {
        if !is_valid_path_component(component) {
            return Err(invalid(
                image,
                format!("invalid repository path component: {component:?}"),
            ));
        }
    }

    Ok(())
}
