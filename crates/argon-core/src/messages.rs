//! Runtime messages from extension pages and content scripts.
//!
//! Requests carry an `action` discriminator; each gets exactly one response.
//! Unknown actions fail to deserialize rather than going unanswered.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::blocking::BlockStats;
use crate::doom::DoomStats;
use crate::error::CoreError;
use crate::router::{Effect, EventRouter};
use crate::storage::KvStore;
use crate::usage::{ScreenTimeState, TopSite, WeeklySummary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    GetBlockedSites,
    AddBlockedSite {
        site: String,
    },
    RemoveBlockedSite {
        site: String,
    },
    GetExtensionStatus,
    ToggleEnabled,
    GetScreenTime,
    AllowSiteTemporarily {
        url: String,
        /// Milliseconds; the configured default when absent.
        #[serde(default)]
        duration: Option<u64>,
    },
    GetTopSites {
        #[serde(default)]
        limit: Option<usize>,
    },
    GetWeeklySummary,
    GetBlockStats,
    OpenQuickNotes,
    DoomScrollDetected {
        #[serde(default)]
        url: String,
    },
    /// Whether the page should run the doom-scroll detector.
    CheckBlockedSite {
        url: String,
    },
    GetDoomSites,
    AddDoomSite {
        site: String,
    },
    RemoveDoomSite {
        site: String,
    },
    GetDoomStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    #[serde(rename_all = "camelCase")]
    BlockedSites { blocked_sites: Vec<String> },
    Success { success: bool },
    Failure { success: bool, error: String },
    #[serde(rename_all = "camelCase")]
    Status { is_enabled: bool },
    #[serde(rename_all = "camelCase")]
    ScreenTime { screen_time_data: ScreenTimeState },
    TopSites { sites: Vec<TopSite> },
    #[serde(rename_all = "camelCase")]
    Weekly { weekly_summary: WeeklySummary },
    #[serde(rename_all = "camelCase")]
    BlockStats { block_stats: BlockStats },
    #[serde(rename_all = "camelCase")]
    IsBlocked { is_blocked: bool },
    DoomSites { sites: Vec<String> },
    #[serde(rename_all = "camelCase")]
    DoomStats { doom_stats: DoomStats },
}

impl Response {
    fn success(success: bool) -> Self {
        Response::Success { success }
    }

    fn failure(error: impl ToString) -> Self {
        Response::Failure {
            success: false,
            error: error.to_string(),
        }
    }
}

/// A response plus whatever the host has to do alongside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub response: Response,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Reply {
            response,
            effects: Vec::new(),
        }
    }
}

impl<S: KvStore> EventRouter<S> {
    /// Answer one runtime message.
    ///
    /// Invalid input becomes a `{success: false, error}` response. Storage
    /// failures are returned as errors; nothing is half-written.
    pub fn handle(&self, request: Request) -> Result<Reply, CoreError> {
        let response = match request {
            Request::GetBlockedSites => Response::BlockedSites {
                blocked_sites: self.blocked_sites()?.entries().to_vec(),
            },
            Request::AddBlockedSite { site } => {
                validated(self.add_blocked_site(&site).map(Response::success))?
            }
            Request::RemoveBlockedSite { site } => {
                validated(self.remove_blocked_site(&site).map(Response::success))?
            }
            Request::GetExtensionStatus => Response::Status {
                is_enabled: self.is_enabled()?,
            },
            Request::ToggleEnabled => Response::Status {
                is_enabled: self.toggle_enabled()?,
            },
            Request::GetScreenTime => Response::ScreenTime {
                screen_time_data: self.screen_time()?,
            },
            Request::AllowSiteTemporarily { url, duration } => {
                Response::success(self.allow_temporarily(&url, duration)?.is_some())
            }
            Request::GetTopSites { limit } => Response::TopSites {
                sites: self.top_sites(limit)?,
            },
            Request::GetWeeklySummary => Response::Weekly {
                weekly_summary: self.weekly_summary()?,
            },
            Request::GetBlockStats => Response::BlockStats {
                block_stats: self.block_stats()?,
            },
            Request::OpenQuickNotes => {
                return Ok(Reply {
                    response: Response::success(true),
                    effects: vec![self.open_quick_notes()],
                })
            }
            Request::DoomScrollDetected { url } => {
                self.record_doom_intervention(&url)?;
                Response::success(true)
            }
            Request::CheckBlockedSite { url } => Response::IsBlocked {
                is_blocked: self.is_doom_site(&url)?,
            },
            Request::GetDoomSites => Response::DoomSites {
                sites: self.doom_sites()?.sites().to_vec(),
            },
            Request::AddDoomSite { site } => {
                validated(self.add_doom_site(&site).map(Response::success))?
            }
            Request::RemoveDoomSite { site } => Response::success(self.remove_doom_site(&site)?),
            Request::GetDoomStats => Response::DoomStats {
                doom_stats: self.doom_stats()?,
            },
        };
        Ok(response.into())
    }

    /// Parse and answer a raw JSON message.
    pub fn handle_json(&self, message: &serde_json::Value) -> Result<Reply, CoreError> {
        let request: Request = serde_json::from_value(message.clone())?;
        self.handle(request)
    }
}

/// Turn validation failures into a failed response; pass other errors on.
fn validated(result: Result<Response, CoreError>) -> Result<Response, CoreError> {
    match result {
        Err(CoreError::Validation(e)) => {
            warn!(error = %e, "rejected input");
            Ok(Response::failure(e))
        }
        other => other,
    }
}
