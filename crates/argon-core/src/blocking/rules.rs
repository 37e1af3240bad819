//! Block list and the block/allow decision.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::allow::TemporaryAllowRegistry;
use crate::domain::normalize_domain;
use crate::error::ValidationError;

/// User-maintained list of blocked entries.
///
/// An entry is either a bare domain (`example.com`) which also covers its
/// subdomains, or a domain with a path (`youtube.com/shorts`) which matches
/// any URL containing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockList {
    entries: Vec<String>,
}

impl BlockList {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a site. Returns `Ok(false)` when it is already present.
    pub fn add(&mut self, site: &str) -> Result<bool, ValidationError> {
        let entry = normalize_site_entry(site)?;
        if self.entries.contains(&entry) {
            return Ok(false);
        }
        self.entries.push(entry);
        Ok(true)
    }

    /// Remove a site. Returns `Ok(false)` when it was not present.
    pub fn remove(&mut self, site: &str) -> Result<bool, ValidationError> {
        let entry = normalize_site_entry(site)?;
        let before = self.entries.len();
        self.entries.retain(|e| *e != entry);
        Ok(self.entries.len() != before)
    }

    /// First entry matching `domain` (already canonical) or the full `url`.
    pub fn matching_entry(&self, domain: &str, url: &str) -> Option<&str> {
        let url = url.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry_matches(entry, domain, &url))
            .map(String::as_str)
    }
}

/// Outcome of a block check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(AllowReason),
    Block { entry: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    Disabled,
    UnknownDomain,
    TemporarilyAllowed,
    NoMatch,
}

impl Decision {
    pub fn is_block(&self) -> bool {
        matches!(self, Decision::Block { .. })
    }
}

/// Decide whether navigation to `url` is blocked.
///
/// Dead temporary-allow entries are evicted as a side effect; everything
/// else is a pure function of the inputs.
pub fn decide(
    url: &str,
    block_list: &BlockList,
    allowed: &mut TemporaryAllowRegistry,
    enabled: bool,
    now_ms: u64,
) -> Decision {
    if !enabled {
        return Decision::Allow(AllowReason::Disabled);
    }
    let domain = normalize_domain(url);
    if domain.is_empty() {
        return Decision::Allow(AllowReason::UnknownDomain);
    }
    if allowed.is_allowed(&domain, now_ms) {
        debug!(domain, "temporarily allowed");
        return Decision::Allow(AllowReason::TemporarilyAllowed);
    }
    match block_list.matching_entry(&domain, url) {
        Some(entry) => Decision::Block {
            entry: entry.to_string(),
        },
        None => Decision::Allow(AllowReason::NoMatch),
    }
}

pub fn should_block(
    url: &str,
    block_list: &BlockList,
    allowed: &mut TemporaryAllowRegistry,
    enabled: bool,
    now_ms: u64,
) -> bool {
    decide(url, block_list, allowed, enabled, now_ms).is_block()
}

/// Canonical stored form of a user-typed site entry.
pub fn normalize_site_entry(site: &str) -> Result<String, ValidationError> {
    let mut entry = site.trim().to_lowercase();
    for scheme in ["https://", "http://"] {
        if let Some(rest) = entry.strip_prefix(scheme) {
            entry = rest.to_string();
        }
    }
    if let Some(rest) = entry.strip_prefix("www.") {
        entry = rest.to_string();
    }
    let entry = entry.trim_end_matches('/').to_string();

    if entry.is_empty() {
        return Err(ValidationError::EmptySite);
    }
    if entry.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidSite(site.trim().to_string()));
    }
    Ok(entry)
}

/// `url` must already be lowercase.
fn entry_matches(entry: &str, domain: &str, url: &str) -> bool {
    let entry = entry.trim().to_lowercase();
    if entry.is_empty() {
        return false;
    }
    domain == entry
        || domain
            .strip_suffix(entry.as_str())
            .is_some_and(|prefix| prefix.ends_with('.'))
        || (entry.contains('/') && url.contains(&entry))
}
