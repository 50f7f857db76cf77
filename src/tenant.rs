//! Tenant resolution.
//!
//! A practice is addressed by its organization slug, either as the first
//! label of the request host (`dr-smith.medfolio.app`) or in the path
//! (`/org/dr-smith`, `/s/dr-smith`).

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

pub const SLUG_MIN_LEN: usize = 3;
pub const SLUG_MAX_LEN: usize = 30;

/// Labels that collide with the app's own routes or infrastructure hosts.
pub const RESERVED_SLUGS: &[&str] = &[
    "www",
    "api",
    "app",
    "admin",
    "dashboard",
    "onboarding",
    "sign-in",
    "static",
    "s",
    "org",
];

fn slug_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9-]+$").expect("Invalid slug regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SlugError {
    #[error("Username must be at least 3 characters")]
    TooShort,

    #[error("Username must be less than 30 characters")]
    TooLong,

    #[error("Username can only contain lowercase letters, numbers, and hyphens")]
    InvalidCharacters,

    #[error("This username is reserved")]
    Reserved,
}

impl SlugError {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::TooShort => "Username must be at least 3 characters",
            Self::TooLong => "Username must be less than 30 characters",
            Self::InvalidCharacters => {
                "Username can only contain lowercase letters, numbers, and hyphens"
            }
            Self::Reserved => "This username is reserved",
        }
    }
}

#[must_use]
pub fn is_valid_slug_format(slug: &str) -> bool {
    slug_regex().is_match(slug)
}

#[must_use]
pub fn is_reserved_slug(slug: &str) -> bool {
    RESERVED_SLUGS.contains(&slug)
}

/// Checks a slug against the same rules the onboarding form enforces on
/// usernames, plus the reserved list.
pub fn validate_slug(slug: &str) -> Result<(), SlugError> {
    let len = slug.chars().count();
    if len < SLUG_MIN_LEN {
        return Err(SlugError::TooShort);
    }
    if len > SLUG_MAX_LEN {
        return Err(SlugError::TooLong);
    }
    if !is_valid_slug_format(slug) {
        return Err(SlugError::InvalidCharacters);
    }
    if is_reserved_slug(slug) {
        return Err(SlugError::Reserved);
    }
    Ok(())
}

/// Normalizes a slug taken from a URL path segment.
#[must_use]
pub fn normalize_slug(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Extracts the tenant slug from a `Host` header value.
///
/// Only a single label in front of `root_domain` resolves; the apex itself,
/// nested subdomains and reserved labels do not.
#[must_use]
pub fn resolve_subdomain(host: &str, root_domain: &str) -> Option<String> {
    let host = strip_port(host.trim()).trim_end_matches('.').to_ascii_lowercase();
    let root = strip_port(root_domain.trim())
        .trim_end_matches('.')
        .to_ascii_lowercase();

    if root.is_empty() || host == root {
        return None;
    }

    let label = host.strip_suffix(&root)?.strip_suffix('.')?;

    if label.is_empty() || label.contains('.') || is_reserved_slug(label) {
        return None;
    }

    if !is_valid_slug_format(label) {
        return None;
    }

    Some(label.to_string())
}

fn strip_port(host: &str) -> &str {
    // Bracketed IPv6 literals never carry a tenant label
    if host.starts_with('[') {
        return host;
    }
    host.rsplit_once(':')
        .filter(|(_, port)| port.chars().all(|c| c.is_ascii_digit()))
        .map_or(host, |(name, _)| name)
}
