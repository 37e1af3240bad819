//! Per-page doom-scroll detector.
//!
//! One detector lives for one page load. The host feeds it scroll offsets and
//! periodic ticks and applies the [`PageEffect`]s it returns; the detector
//! itself touches neither the DOM nor storage.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Monitoring -> InterventionActive(Overlay -> MessageScreen) -> Idle
//! ```
//!
//! The intervention fires at most once per page load.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const SCROLL_THRESHOLD_PX: f64 = 4000.0;
pub const MESSAGE_DELAY_MS: u64 = 2000;

pub const OVERLAY_TEXT: &str = "DOOM SCROLL DETECTED!";

pub const INTERVENTION_MESSAGES: [&str; 18] = [
    "TOUCH SOME GRASS",
    "GO OUTSIDE",
    "TIME TO STEP AWAY",
    "BREATHE FRESH AIR",
    "MOVE YOUR BODY",
    "DISCONNECT TO RECONNECT",
    "TAKE A WALK",
    "SEE THE SKY",
    "FEEL THE SUN",
    "NATURE IS CALLING",
    "LOOK UP FROM SCREEN",
    "GET SOME VITAMIN D",
    "STRETCH YOUR LEGS",
    "CLEAR YOUR MIND",
    "REAL LIFE AWAITS",
    "STEP INTO REALITY",
    "FIND SOME PEACE",
    "RECONNECT WITH EARTH",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorState {
    Idle,
    Monitoring,
    InterventionActive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum InterventionPhase {
    /// Page dimmed behind the warning overlay.
    Overlay { since_ms: u64 },
    /// Terminal: full-screen messages until navigation or reload.
    MessageScreen { messages: Vec<String> },
}

/// Instructions for the page host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEffect {
    AttachScrollListener,
    DetachScrollListener,
    /// Forward to the background as `doomScrollDetected`.
    ReportIntervention { url: String },
    /// Dim the page and show [`OVERLAY_TEXT`].
    ShowOverlay,
    /// Replace the overlay with the message screen.
    ShowMessageScreen { messages: Vec<String> },
    /// Remove any overlay and restore the page.
    RemoveOverlays,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub threshold_px: f64,
    pub message_delay_ms: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold_px: SCROLL_THRESHOLD_PX,
            message_delay_ms: MESSAGE_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoomScrollDetector {
    config: DetectorConfig,
    url: String,
    state: DetectorState,
    phase: Option<InterventionPhase>,
    last_offset_px: f64,
    scrolled_down_px: f64,
    /// Set once the intervention has fired on this page load.
    triggered: bool,
}

impl DoomScrollDetector {
    pub fn new(url: impl Into<String>, config: DetectorConfig) -> Self {
        Self {
            config,
            url: url.into(),
            state: DetectorState::Idle,
            phase: None,
            last_offset_px: 0.0,
            scrolled_down_px: 0.0,
            triggered: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn phase(&self) -> Option<&InterventionPhase> {
        self.phase.as_ref()
    }

    pub fn scrolled_down_px(&self) -> f64 {
        self.scrolled_down_px
    }

    pub fn has_triggered(&self) -> bool {
        self.triggered
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Answer to `checkBlockedSite`: whether this page is on the doom list.
    pub fn set_monitored(&mut self, monitored: bool) -> Vec<PageEffect> {
        match (self.state, monitored) {
            (DetectorState::Idle, true) => {
                self.state = DetectorState::Monitoring;
                debug!(url = %self.url, "doom scroll monitoring started");
                vec![PageEffect::AttachScrollListener]
            }
            (DetectorState::Idle, false) => Vec::new(),
            (_, true) => Vec::new(),
            (_, false) => self.stop(),
        }
    }

    /// Feed the page's current vertical scroll offset.
    pub fn on_scroll(&mut self, offset_px: f64, now_ms: u64) -> Vec<PageEffect> {
        let delta = offset_px - self.last_offset_px;
        self.last_offset_px = offset_px;
        if delta > 0.0 {
            self.scrolled_down_px += delta;
        }

        let should_fire = self.state == DetectorState::Monitoring
            && !self.triggered
            && delta > 0.0
            && self.scrolled_down_px > self.config.threshold_px;
        if !should_fire {
            return Vec::new();
        }

        self.triggered = true;
        self.state = DetectorState::InterventionActive;
        self.phase = Some(InterventionPhase::Overlay { since_ms: now_ms });
        info!(url = %self.url, scrolled = self.scrolled_down_px, "doom scroll detected");
        vec![
            PageEffect::ReportIntervention {
                url: self.url.clone(),
            },
            PageEffect::ShowOverlay,
        ]
    }

    /// Advance the overlay to the message screen once the delay has passed.
    pub fn tick(&mut self, now_ms: u64) -> Vec<PageEffect> {
        self.tick_with_rng(now_ms, &mut rand::thread_rng())
    }

    pub fn tick_with_rng<R: Rng + ?Sized>(&mut self, now_ms: u64, rng: &mut R) -> Vec<PageEffect> {
        let Some(InterventionPhase::Overlay { since_ms }) = self.phase else {
            return Vec::new();
        };
        if now_ms.saturating_sub(since_ms) < self.config.message_delay_ms {
            return Vec::new();
        }
        let messages = pick_messages(rng);
        self.phase = Some(InterventionPhase::MessageScreen {
            messages: messages.clone(),
        });
        vec![PageEffect::ShowMessageScreen { messages }]
    }

    /// The page navigated or reloaded: start over as a fresh page load.
    pub fn on_navigation(&mut self, url: impl Into<String>) -> Vec<PageEffect> {
        let effects = if self.state == DetectorState::Idle {
            Vec::new()
        } else {
            self.stop()
        };
        *self = Self::new(url, self.config);
        effects
    }

    fn stop(&mut self) -> Vec<PageEffect> {
        self.state = DetectorState::Idle;
        self.phase = None;
        debug!(url = %self.url, "doom scroll monitoring stopped");
        vec![PageEffect::DetachScrollListener, PageEffect::RemoveOverlays]
    }
}

/// Three or four distinct messages in random order.
pub fn pick_messages<R: Rng + ?Sized>(rng: &mut R) -> Vec<String> {
    let count = rng.gen_range(3..=4);
    INTERVENTION_MESSAGES
        .choose_multiple(rng, count)
        .map(|m| (*m).to_string())
        .collect()
}
