//! Doom-scroll protection: watched sites, the in-page detector and
//! intervention statistics.

mod detector;
mod sites;
mod stats;

pub use detector::{
    pick_messages, DetectorConfig, DetectorState, DoomScrollDetector, InterventionPhase,
    PageEffect, INTERVENTION_MESSAGES, MESSAGE_DELAY_MS, OVERLAY_TEXT, SCROLL_THRESHOLD_PX,
};
pub use sites::{DoomSiteList, DEFAULT_DOOM_SITES};
pub use stats::{DoomStats, MINUTES_SAVED_PER_INTERVENTION};
