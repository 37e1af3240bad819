//! Named periodic callbacks on the tokio runtime.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// A repeating timer. The first firing happens one `period` after
/// creation; late firings are skipped rather than replayed.
///
/// Cancelled explicitly with [`Alarm::cancel`] or implicitly on drop.
#[derive(Debug)]
pub struct Alarm {
    name: String,
    handle: Option<JoinHandle<()>>,
}

impl Alarm {
    /// Spawn `callback` every `period` on the current tokio runtime.
    ///
    /// Must be called from within a runtime.
    pub fn every<F>(name: impl Into<String>, period: Duration, mut callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let name = name.into();
        let period = period.max(Duration::from_millis(1));
        let task_name = name.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                debug!(alarm = %task_name, "alarm fired");
                callback();
            }
        });
        Self {
            name,
            handle: Some(handle),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop future firings. Calling it again is a no-op.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!(alarm = %self.name, "alarm cancelled");
        }
    }
}

impl Drop for Alarm {
    fn drop(&mut self) {
        self.cancel();
    }
}
