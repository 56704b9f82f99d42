//! Periodic background refresh
//!
//! The polling task lives exactly as long as its handle. Dropping the
//! `RefreshTask` (or the `Mounted` view that owns it) aborts the task on every
//! exit path, so no timer keeps firing after the view is gone.

use crate::store::Store;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Default polling interval
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Handle to a running refresh loop
#[derive(Debug)]
pub struct RefreshTask {
    handle: JoinHandle<()>,
    every: Duration,
}

impl RefreshTask {
    /// Start polling; the first tick fires one interval from now
    ///
    /// # Panics
    /// Panics if `every` is zero or if called outside a Tokio runtime
    #[must_use]
    pub fn spawn(store: Arc<Store>, every: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                store.tick().await;
            }
        });
        tracing::debug!(?every, "refresh task started");
        Self { handle, every }
    }

    /// Polling interval
    #[inline]
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.every
    }

    /// Task has not been stopped
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop polling now
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.handle.abort();
        tracing::debug!("refresh task stopped");
    }
}

/// A mounted view: loaded store plus its refresh loop
#[derive(Debug)]
pub struct Mounted {
    store: Arc<Store>,
    refresh: RefreshTask,
}

impl Mounted {
    /// Mounted store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Refresh loop
    #[inline]
    #[must_use]
    pub fn refresh_task(&self) -> &RefreshTask {
        &self.refresh
    }

    /// Tear down; the refresh loop stops
    pub fn unmount(self) {
        drop(self);
    }
}

impl Store {
    /// Run the initial load and connectivity probe, then start polling
    pub async fn mount(self: &Arc<Self>, every: Duration) -> Mounted {
        self.load().await;
        self.probe_status().await;
        Mounted {
            store: Arc::clone(self),
            refresh: RefreshTask::spawn(Arc::clone(self), every),
        }
    }
}
