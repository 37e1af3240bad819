use std::sync::Arc;

use argon_core::{Config, Database, EventRouter, SystemClock};
use serde::Serialize;

pub mod browser;
pub mod config;
pub mod reminders;
pub mod timer;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Router over the on-disk database, the system clock and the user config.
pub fn open_router() -> Result<EventRouter<Database>, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    Ok(EventRouter::new(
        db,
        Arc::new(SystemClock),
        Config::load_or_default(),
    ))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
