//! Screen-time accounting.

mod report;
mod state;

pub use report::{format_duration, top_sites, weekly_summary, DayTotal, TopSite, WeeklySummary};
pub use state::{HourOfDay, ScreenTimeState, SiteUsage, HISTORY_DAYS};
