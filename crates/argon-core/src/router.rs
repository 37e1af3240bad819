//! Browser lifecycle events in, effects out.
//!
//! The router owns no state of its own. Every handler reloads what it needs
//! from the [`ExtensionStore`], decides, writes back, and returns a list of
//! [`Effect`]s for the host to carry out (redirects, script injection,
//! messages to pages). Concurrent handlers follow load-mutate-save with no
//! locking, so two racing writers to one key can lose an increment.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::blocking::{
    block_page_url, decide, BlockList, BlockStats, Decision, TemporaryAllowRegistry,
};
use crate::clock::Clock;
use crate::domain::{is_internal_url, normalize_domain};
use crate::error::{CoreError, StorageError};
use crate::storage::{Config, ExtensionStore, KvStore, StorageKey};
use crate::usage::{top_sites, weekly_summary, ScreenTimeState, TopSite, WeeklySummary};

/// Dashboard page opened by `openQuickNotes`.
pub const DASHBOARD_PAGE: &str = "dashboard.html";
pub const QUICK_NOTES_FRAGMENT: &str = "quick-notes";
/// Content script injected into monitored pages.
pub const DOOM_CONTENT_SCRIPT: &str = "feat/doom/contentScript.js";

pub type TabId = i64;

/// Something the host must do on the router's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "camelCase")]
pub enum Effect {
    /// Point the tab at `url`.
    #[serde(rename_all = "camelCase")]
    Redirect { tab_id: TabId, url: String },
    /// Run the doom-scroll content script in the tab.
    #[serde(rename_all = "camelCase")]
    InjectScript { tab_id: TabId, file: String },
    /// Ask the page whether it should be monitored.
    #[serde(rename_all = "camelCase")]
    SendCheckBlockedSite { tab_id: TabId, url: String },
    /// Focus an open dashboard tab, or create one, at `url`.
    OpenDashboard { url: String },
}

/// `webNavigation.onBeforeNavigate` details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub tab_id: TabId,
    /// 0 for the top-level frame.
    pub frame_id: i64,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Complete,
}

/// `tabs.onUpdated` details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabUpdate {
    pub tab_id: TabId,
    pub url: String,
    pub status: LoadStatus,
    /// Whether this update changed the tab's URL.
    pub url_changed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
    /// The visibility probe failed.
    Unknown,
}

/// The active tab of the current window, as seen by the periodic tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTab {
    pub url: String,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum TickOutcome {
    Recorded { domain: String },
    NoActiveTab,
    Hidden,
    VisibilityUnknown,
    InternalPage,
}

pub struct EventRouter<S> {
    store: ExtensionStore<S>,
    clock: Arc<dyn Clock>,
    config: Config,
}

impl<S: KvStore> EventRouter<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>, config: Config) -> Self {
        Self {
            store: ExtensionStore::new(store),
            clock,
            config,
        }
    }

    pub fn store(&self) -> &ExtensionStore<S> {
        &self.store
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn is_internal(&self, url: &str) -> bool {
        is_internal_url(url, &self.config.blocking.extension_base)
    }

    fn extension_url(&self, path: &str) -> String {
        format!(
            "{}/{path}",
            self.config.blocking.extension_base.trim_end_matches('/')
        )
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// First install or update: seed records that are missing.
    pub fn on_installed(&self) -> Result<Vec<StorageKey>, StorageError> {
        self.store.seed_defaults(self.clock.today())
    }

    pub fn on_before_navigate(&self, nav: &Navigation) -> Vec<Effect> {
        if nav.frame_id != 0 {
            return Vec::new();
        }
        self.block_if_needed(nav.tab_id, &nav.url)
            .into_iter()
            .collect()
    }

    pub fn on_tab_updated(&self, update: &TabUpdate) -> Vec<Effect> {
        if update.status != LoadStatus::Complete {
            return Vec::new();
        }
        if update.url_changed {
            if let Some(redirect) = self.block_if_needed(update.tab_id, &update.url) {
                return vec![redirect];
            }
        }
        self.doom_injection(update.tab_id, &update.url)
    }

    /// The tab at `url` just became active. `None` when the host could not
    /// read the tab's URL.
    pub fn on_tab_activated(&self, tab_id: TabId, url: Option<&str>) -> Vec<Effect> {
        url.and_then(|url| self.block_if_needed(tab_id, url))
            .into_iter()
            .collect()
    }

    /// One second of attention. Credits the active tab if it is visible.
    ///
    /// # Errors
    /// Storage failures are returned; the persisted record is left as it was.
    pub fn on_tick(&self, active: Option<&ActiveTab>) -> Result<TickOutcome, StorageError> {
        let Some(tab) = active else {
            return Ok(TickOutcome::NoActiveTab);
        };
        if self.is_internal(&tab.url) {
            return Ok(TickOutcome::InternalPage);
        }
        match tab.visibility {
            Visibility::Visible => {}
            Visibility::Hidden => return Ok(TickOutcome::Hidden),
            Visibility::Unknown => {
                debug!(url = %tab.url, "visibility unknown; tick skipped");
                return Ok(TickOutcome::VisibilityUnknown);
            }
        }

        let now = self.clock.local_now();
        let domain = normalize_domain(&tab.url);
        let mut state = self.store.screen_time(now.date())?;
        state.record_active_second(&domain, now);
        self.store.save_screen_time(&state)?;
        Ok(TickOutcome::Recorded { domain })
    }

    // ── Blocking ─────────────────────────────────────────────────────

    /// Decide for `url` and, when blocked, count it and build the redirect.
    /// Storage read failures fail open.
    fn block_if_needed(&self, tab_id: TabId, url: &str) -> Option<Effect> {
        if self.is_internal(url) {
            return None;
        }
        let (list, mut allowed, enabled) = match self.load_blocking() {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(url, error = %e, "could not load blocking state; allowing");
                return None;
            }
        };

        let before = allowed.len();
        let decision = decide(url, &list, &mut allowed, enabled, self.clock.now_ms());
        if allowed.len() != before {
            if let Err(e) = self.store.save_temporary_allowed(&allowed) {
                warn!(error = %e, "could not persist expired allow entries");
            }
        }

        match decision {
            Decision::Block { entry } => {
                info!(url, %entry, "blocking navigation");
                self.record_block(url);
                Some(Effect::Redirect {
                    tab_id,
                    url: block_page_url(
                        &self.config.blocking.extension_base,
                        &self.config.blocking.block_page,
                        url,
                    ),
                })
            }
            Decision::Allow(reason) => {
                debug!(url, ?reason, "navigation allowed");
                None
            }
        }
    }

    fn load_blocking(&self) -> Result<(BlockList, TemporaryAllowRegistry, bool), StorageError> {
        Ok((
            self.store.blocked_sites()?,
            self.store.temporary_allowed()?,
            self.store.is_enabled()?,
        ))
    }

    fn record_block(&self, url: &str) {
        let domain = normalize_domain(url);
        let result = self.store.block_counts().and_then(|mut counts| {
            counts.increment(&domain);
            self.store.save_block_counts(&counts)
        });
        if let Err(e) = result {
            warn!(%domain, error = %e, "could not record blocked attempt");
        }
    }

    /// Whether `url` would be blocked right now.
    pub fn check_url(&self, url: &str) -> Result<bool, StorageError> {
        if self.is_internal(url) {
            return Ok(false);
        }
        let (list, mut allowed, enabled) = self.load_blocking()?;
        Ok(decide(url, &list, &mut allowed, enabled, self.clock.now_ms()).is_block())
    }

    pub fn blocked_sites(&self) -> Result<BlockList, StorageError> {
        self.store.blocked_sites()
    }

    /// Returns `false` when the site is already on the list.
    pub fn add_blocked_site(&self, site: &str) -> Result<bool, CoreError> {
        let mut list = self.store.blocked_sites()?;
        let added = list.add(site)?;
        if added {
            self.store.save_blocked_sites(&list)?;
            info!(site, "added to block list");
        }
        Ok(added)
    }

    /// Returns `false` when the site was not on the list.
    pub fn remove_blocked_site(&self, site: &str) -> Result<bool, CoreError> {
        let mut list = self.store.blocked_sites()?;
        let removed = list.remove(site)?;
        if removed {
            self.store.save_blocked_sites(&list)?;
            info!(site, "removed from block list");
        }
        Ok(removed)
    }

    pub fn is_enabled(&self) -> Result<bool, StorageError> {
        self.store.is_enabled()
    }

    /// Flip the enabled flag and return the new value.
    pub fn toggle_enabled(&self) -> Result<bool, StorageError> {
        let enabled = !self.store.is_enabled()?;
        self.store.set_enabled(enabled)?;
        info!(enabled, "extension toggled");
        Ok(enabled)
    }

    /// Let the domain of `url` through for `duration_ms` (default from
    /// config). Returns the expiry, or `None` if `url` has no domain.
    pub fn allow_temporarily(
        &self,
        url: &str,
        duration_ms: Option<u64>,
    ) -> Result<Option<u64>, StorageError> {
        let domain = normalize_domain(url);
        if domain.is_empty() {
            return Ok(None);
        }
        let duration = duration_ms.unwrap_or_else(|| self.config.blocking.allow_duration_ms());
        let mut allowed = self.store.temporary_allowed()?;
        let expiry = allowed.allow(&domain, duration, self.clock.now_ms());
        self.store.save_temporary_allowed(&allowed)?;
        info!(%domain, expiry, "temporarily allowed");
        Ok(Some(expiry))
    }

    pub fn block_stats(&self) -> Result<BlockStats, StorageError> {
        let counts = self.store.block_counts()?;
        Ok(BlockStats::from_counts(
            &counts,
            self.config.blocking.minutes_saved_per_block,
        ))
    }

    // ── Screen time ──────────────────────────────────────────────────

    pub fn screen_time(&self) -> Result<ScreenTimeState, StorageError> {
        self.store.screen_time(self.clock.today())
    }

    pub fn top_sites(&self, limit: Option<usize>) -> Result<Vec<TopSite>, StorageError> {
        let limit = limit.unwrap_or(self.config.tracking.top_sites_limit);
        Ok(top_sites(&self.screen_time()?, limit))
    }

    pub fn weekly_summary(&self) -> Result<WeeklySummary, StorageError> {
        let today = self.clock.today();
        Ok(weekly_summary(&self.store.screen_time(today)?, today))
    }

    pub fn open_quick_notes(&self) -> Effect {
        Effect::OpenDashboard {
            url: self.extension_url(&format!("{DASHBOARD_PAGE}#{QUICK_NOTES_FRAGMENT}")),
        }
    }

    // ── Doom scroll ──────────────────────────────────────────────────

    fn doom_injection(&self, tab_id: TabId, url: &str) -> Vec<Effect> {
        match self.is_doom_site(url) {
            Ok(true) => {
                debug!(url, "injecting doom scroll detector");
                vec![
                    Effect::InjectScript {
                        tab_id,
                        file: DOOM_CONTENT_SCRIPT.to_string(),
                    },
                    Effect::SendCheckBlockedSite {
                        tab_id,
                        url: url.to_string(),
                    },
                ]
            }
            Ok(false) => Vec::new(),
            Err(e) => {
                warn!(url, error = %e, "could not load doom sites");
                Vec::new()
            }
        }
    }

    /// Whether the page at `url` is subject to doom-scroll monitoring.
    pub fn is_doom_site(&self, url: &str) -> Result<bool, StorageError> {
        if self.is_internal(url) {
            return Ok(false);
        }
        let domain = normalize_domain(url);
        if domain.is_empty() {
            return Ok(false);
        }
        Ok(self.store.doom_sites()?.matches(&domain, url))
    }

    /// A page reported an intervention.
    pub fn record_doom_intervention(&self, url: &str) -> Result<crate::doom::DoomStats, StorageError> {
        let today = self.clock.today();
        let mut stats = self.store.doom_stats(today)?;
        stats.record_intervention(today, self.config.doom.minutes_saved_per_intervention);
        self.store.save_doom_stats(&stats)?;
        debug!(url, "doom intervention stored");
        Ok(stats)
    }

    pub fn doom_stats(&self) -> Result<crate::doom::DoomStats, StorageError> {
        self.store.doom_stats(self.clock.today())
    }

    pub fn doom_sites(&self) -> Result<crate::doom::DoomSiteList, StorageError> {
        self.store.doom_sites()
    }

    pub fn add_doom_site(&self, site: &str) -> Result<bool, CoreError> {
        let mut sites = self.store.doom_sites()?;
        let added = sites.add(site)?;
        if added {
            self.store.save_doom_sites(&sites)?;
            info!(site, "added to doom scroll sites");
        }
        Ok(added)
    }

    pub fn remove_doom_site(&self, site: &str) -> Result<bool, StorageError> {
        let mut sites = self.store.doom_sites()?;
        let removed = sites.remove(site);
        if removed {
            self.store.save_doom_sites(&sites)?;
            info!(site, "removed from doom scroll sites");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;
    use chrono::{Duration, NaiveDate};

    fn router() -> (EventRouter<MemoryStore>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at(
            NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            14,
        ));
        let router = EventRouter::new(MemoryStore::new(), clock.clone(), Config::default());
        router.on_installed().unwrap();
        (router, clock)
    }

    fn nav(url: &str) -> Navigation {
        Navigation {
            tab_id: 7,
            frame_id: 0,
            url: url.to_string(),
        }
    }

    fn visible(url: &str) -> ActiveTab {
        ActiveTab {
            url: url.to_string(),
            visibility: Visibility::Visible,
        }
    }

    #[test]
    fn blocked_navigation_redirects_and_counts() {
        let (router, _) = router();
        router.add_blocked_site("example.com").unwrap();

        let effects = router.on_before_navigate(&nav("https://sub.example.com/page"));
        assert_eq!(
            effects,
            vec![Effect::Redirect {
                tab_id: 7,
                url: "chrome-extension://argon/block.html?blocked=https%3A%2F%2Fsub.example.com%2Fpage"
                    .to_string(),
            }]
        );
        assert_eq!(router.store().block_counts().unwrap().get("sub.example.com"), 1);
        assert!(router.on_before_navigate(&nav("https://notexample.com")).is_empty());
    }

    #[test]
    fn subframes_are_ignored() {
        let (router, _) = router();
        router.add_blocked_site("example.com").unwrap();
        let mut navigation = nav("https://example.com");
        navigation.frame_id = 3;
        assert!(router.on_before_navigate(&navigation).is_empty());
    }

    #[test]
    fn disabled_extension_never_blocks() {
        let (router, _) = router();
        router.add_blocked_site("example.com").unwrap();
        assert!(!router.toggle_enabled().unwrap());
        assert!(router.on_tab_activated(1, Some("https://example.com")).is_empty());
        assert!(router.toggle_enabled().unwrap());
        assert_eq!(router.on_tab_activated(1, Some("https://example.com")).len(), 1);
        assert!(router.on_tab_activated(1, None).is_empty());
    }

    #[test]
    fn temporary_allow_expires() {
        let (router, clock) = router();
        router.add_blocked_site("example.com").unwrap();
        router
            .allow_temporarily("https://example.com/x", Some(5000))
            .unwrap();

        clock.advance(Duration::milliseconds(4999));
        assert!(!router.check_url("https://example.com").unwrap());
        clock.advance(Duration::milliseconds(1));
        assert_eq!(router.on_before_navigate(&nav("https://example.com")).len(), 1);
        // The dead entry was evicted and persisted.
        assert!(router.store().temporary_allowed().unwrap().is_empty());
    }

    #[test]
    fn tab_update_blocks_only_on_completed_url_change() {
        let (router, _) = router();
        router.add_blocked_site("example.com").unwrap();
        let mut update = TabUpdate {
            tab_id: 2,
            url: "https://example.com".to_string(),
            status: LoadStatus::Loading,
            url_changed: true,
        };
        assert!(router.on_tab_updated(&update).is_empty());

        update.status = LoadStatus::Complete;
        assert!(matches!(
            router.on_tab_updated(&update).as_slice(),
            [Effect::Redirect { tab_id: 2, .. }]
        ));

        update.url_changed = false;
        assert!(router.on_tab_updated(&update).is_empty());
    }

    #[test]
    fn doom_sites_get_the_detector() {
        let (router, _) = router();
        let update = TabUpdate {
            tab_id: 4,
            url: "https://www.reddit.com/r/all".to_string(),
            status: LoadStatus::Complete,
            url_changed: false,
        };
        assert_eq!(
            router.on_tab_updated(&update),
            vec![
                Effect::InjectScript {
                    tab_id: 4,
                    file: DOOM_CONTENT_SCRIPT.to_string()
                },
                Effect::SendCheckBlockedSite {
                    tab_id: 4,
                    url: "https://www.reddit.com/r/all".to_string()
                },
            ]
        );
    }

    #[test]
    fn tick_credits_visible_tabs_only() {
        let (router, _) = router();
        assert_eq!(
            router.on_tick(Some(&visible("https://www.github.com/rust"))).unwrap(),
            TickOutcome::Recorded {
                domain: "github.com".to_string()
            }
        );
        let hidden = ActiveTab {
            url: "https://github.com".to_string(),
            visibility: Visibility::Hidden,
        };
        assert_eq!(router.on_tick(Some(&hidden)).unwrap(), TickOutcome::Hidden);
        assert_eq!(router.on_tick(None).unwrap(), TickOutcome::NoActiveTab);
        assert_eq!(
            router
                .on_tick(Some(&visible("chrome-extension://argon/dashboard.html")))
                .unwrap(),
            TickOutcome::InternalPage
        );

        let state = router.screen_time().unwrap();
        assert_eq!(state.today_seconds(), 1);
        assert_eq!(state.site("github.com").unwrap().today_seconds, 1);
    }

    #[test]
    fn uppercase_internal_scheme_is_not_tracked() {
        let (router, _) = router();
        assert_eq!(
            router.on_tick(Some(&visible("CHROME://settings"))).unwrap(),
            TickOutcome::InternalPage
        );
        assert!(router.on_before_navigate(&nav("Chrome://settings")).is_empty());
        let state = router.screen_time().unwrap();
        assert_eq!(state.today_seconds(), 0);
        assert!(state.site("settings").is_none());
    }

    #[test]
    fn doom_interventions_accumulate() {
        let (router, clock) = router();
        router.record_doom_intervention("https://x.com").unwrap();
        clock.advance(Duration::days(1));
        let stats = router.record_doom_intervention("https://x.com").unwrap();
        assert_eq!(stats.streak(), 1);
        assert_eq!(stats.time_saved(), 10);
    }

    #[test]
    fn quick_notes_points_at_dashboard() {
        let (router, _) = router();
        assert_eq!(
            router.open_quick_notes(),
            Effect::OpenDashboard {
                url: "chrome-extension://argon/dashboard.html#quick-notes".to_string()
            }
        );
    }
}
