use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Domain -> number of blocked navigation attempts. Never reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockCounts {
    counts: BTreeMap<String, u64>,
}

impl BlockCounts {
    /// Record one blocked attempt, returning the new count for `domain`.
    pub fn increment(&mut self, domain: &str) -> u64 {
        let count = self.counts.entry(domain.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub fn get(&self, domain: &str) -> u64 {
        self.counts.get(domain).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(d, c)| (d.as_str(), *c))
    }
}

/// Aggregate shown on the block page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStats {
    pub total_blocks: u64,
    pub minutes_saved: u64,
}

impl BlockStats {
    pub fn from_counts(counts: &BlockCounts, minutes_per_block: u64) -> Self {
        let total_blocks = counts.total();
        Self {
            total_blocks,
            minutes_saved: total_blocks.saturating_mul(minutes_per_block),
        }
    }
}
