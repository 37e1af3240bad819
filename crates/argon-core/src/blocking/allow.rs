//! Time-boxed "allow once" overrides.
//!
//! Entries are never evicted by a timer. An entry whose expiry is at or
//! before `now` is dead: readers treat it as absent and the first mutable
//! read deletes it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical domain -> expiry (epoch ms).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemporaryAllowRegistry {
    entries: BTreeMap<String, u64>,
}

impl TemporaryAllowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `domain` until `now_ms + duration_ms`. Last call wins; durations
    /// never stack. Returns the new expiry.
    pub fn allow(&mut self, domain: &str, duration_ms: u64, now_ms: u64) -> u64 {
        let expiry = now_ms.saturating_add(duration_ms);
        self.entries.insert(domain.to_string(), expiry);
        expiry
    }

    /// Whether `domain` has a live entry. Dead entries are dropped.
    pub fn is_allowed(&mut self, domain: &str, now_ms: u64) -> bool {
        self.evict_expired(now_ms);
        self.entries.contains_key(domain)
    }

    /// Live expiry for `domain` without mutating the registry.
    pub fn expiry(&self, domain: &str, now_ms: u64) -> Option<u64> {
        self.entries
            .get(domain)
            .copied()
            .filter(|&expiry| expiry > now_ms)
    }

    /// Drop every dead entry, returning how many were removed.
    pub fn evict_expired(&mut self, now_ms: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, expiry| *expiry > now_ms);
        before - self.entries.len()
    }

    pub fn revoke(&mut self, domain: &str) -> bool {
        self.entries.remove(domain).is_some()
    }

    /// Number of stored entries, dead ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
