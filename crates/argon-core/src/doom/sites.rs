//! Sites watched for doom scrolling. Independent of the block list.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Seeded on first install.
pub const DEFAULT_DOOM_SITES: [&str; 7] = [
    "facebook.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "reddit.com",
    "youtube.com/shorts",
    "tiktok.com",
];

fn site_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^[a-z0-9.-]+\.[a-z]{2,}(/[a-z0-9\-._~%!$&'()*+,;=:@/]*\*?)?$")
            .unwrap_or_else(|e| unreachable!("static doom site pattern is valid: {e}"))
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DoomSiteList {
    sites: Vec<String>,
}

impl Default for DoomSiteList {
    fn default() -> Self {
        Self::new(DEFAULT_DOOM_SITES)
    }
}

impl DoomSiteList {
    pub fn new<I, S>(sites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sites: sites.into_iter().map(Into::into).collect(),
        }
    }

    pub fn empty() -> Self {
        Self { sites: Vec::new() }
    }

    pub fn sites(&self) -> &[String] {
        &self.sites
    }

    /// Add a validated pattern. Returns `Ok(false)` on duplicates.
    pub fn add(&mut self, site: &str) -> Result<bool, ValidationError> {
        let site = site.trim().to_lowercase();
        if site.is_empty() {
            return Err(ValidationError::EmptySite);
        }
        if !site_pattern().is_match(&site) {
            return Err(ValidationError::InvalidSite(site));
        }
        if self.sites.contains(&site) {
            return Ok(false);
        }
        self.sites.push(site);
        Ok(true)
    }

    pub fn remove(&mut self, site: &str) -> bool {
        let site = site.trim().to_lowercase();
        let before = self.sites.len();
        self.sites.retain(|s| *s != site);
        self.sites.len() != before
    }

    /// Whether a page with canonical `domain` and full `url` is monitored.
    pub fn matches(&self, domain: &str, url: &str) -> bool {
        let url = url.to_lowercase();
        self.sites.iter().any(|site| {
            domain == site
                || domain
                    .strip_suffix(site.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
                || (site.contains('/') && url.contains(site.as_str()))
        })
    }
}
