//! # Argon Core Library
//!
//! This library provides the core logic of the Argon browser productivity
//! extension: site blocking, screen-time accounting, doom-scroll detection,
//! a pomodoro timer and health reminders. The browser side is a thin shell
//! that forwards lifecycle events and runtime messages to the
//! [`EventRouter`] and carries out the [`Effect`]s it returns.
//!
//! ## Architecture
//!
//! - **Domain Normalizer**: URL to canonical domain, failing open
//! - **Rule Matcher**: block list plus temporary allows, in [`blocking`]
//! - **Usage Aggregator**: per-day, per-hour and per-site seconds with lazy
//!   rollover, in [`usage`]
//! - **Doom-Scroll Detector**: per-page scroll state machine, in [`doom`]
//! - **Storage**: a key/value [`KvStore`] (in-memory or SQLite) and TOML
//!   configuration
//!
//! Nothing is cached between events. Every handler reloads its records
//! from the store, so the host may drop and rebuild the router at any time.
//!
//! ## Key Components
//!
//! - [`EventRouter`]: lifecycle handlers and the message dispatcher
//! - [`ScreenTimeState`]: the usage aggregator
//! - [`DoomScrollDetector`]: in-page intervention protocol
//! - [`PomodoroTimer`]: wall-clock timer engine
//! - [`Alarm`]: periodic callbacks with idempotent cancellation

pub mod alarm;
pub mod blocking;
pub mod clock;
pub mod domain;
pub mod doom;
pub mod error;
pub mod events;
pub mod messages;
pub mod reminders;
pub mod router;
pub mod storage;
pub mod timer;
pub mod usage;

pub use alarm::Alarm;
pub use blocking::{should_block, BlockList, Decision, TemporaryAllowRegistry};
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::normalize_domain;
pub use doom::{DoomScrollDetector, DoomSiteList, DoomStats};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use messages::{Reply, Request, Response};
pub use reminders::{HealthReminders, ReminderKind};
pub use router::{ActiveTab, Effect, EventRouter, Navigation, TabUpdate, TickOutcome, Visibility};
pub use storage::{Config, Database, ExtensionStore, KvStore, MemoryStore, StorageKey};
pub use timer::{PomodoroTimer, TimerCommand, TimerMode, TimerState};
pub use usage::ScreenTimeState;
