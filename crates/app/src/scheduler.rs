//! Timer that runs incremental syncs in the background.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use points_core::{DEFAULT_AUTO_SYNC_INTERVAL_MINUTES, SyncConfig, SyncRunState};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::error::{AppError, Result};
use crate::services::SyncService;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Shared run bookkeeping; at most one scheduled run holds the guard.
#[derive(Clone, Default)]
pub struct RunTracker {
    state: Arc<Mutex<SyncRunState>>,
}

impl RunTracker {
    /// Marks a run as started, or returns `None` when one is already running.
    pub fn try_begin(&self) -> Option<RunGuard> {
        let mut state = lock(&self.state);
        if state.running {
            return None;
        }
        state.running = true;
        Some(RunGuard {
            tracker: self.clone(),
            finished: false,
        })
    }

    pub fn snapshot(&self) -> SyncRunState {
        lock(&self.state).clone()
    }

    fn record(&self, result: String) {
        let mut state = lock(&self.state);
        state.running = false;
        state.last_run_at = Some(now_rfc3339());
        state.last_run_result = result;
    }
}

/// Clears the running flag when dropped.
pub struct RunGuard {
    tracker: RunTracker,
    finished: bool,
}

impl RunGuard {
    pub fn finish(mut self, result: String) {
        self.finished = true;
        self.tracker.record(result);
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.tracker.record("Error: run aborted".to_string());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Another run held the guard; nothing was recorded.
    Dropped,
    Recorded(String),
}

struct Timer {
    interval_minutes: u32,
    stop: oneshot::Sender<()>,
}

/// Owns the auto-sync timer and the process-wide run state.
#[derive(Clone)]
pub struct Scheduler {
    sync: SyncService,
    tracker: RunTracker,
    timer: Arc<Mutex<Option<Timer>>>,
}

impl Scheduler {
    pub(crate) fn new(sync: SyncService) -> Self {
        Self {
            sync,
            tracker: RunTracker::default(),
            timer: Arc::new(Mutex::new(None)),
        }
    }

    /// Replaces any running timer with one firing every `interval_minutes`
    /// (0 falls back to the default). The first run happens one interval
    /// after start. Must be called from within a tokio runtime.
    pub fn start(&self, interval_minutes: u32) -> Result<()> {
        let interval_minutes = if interval_minutes == 0 {
            DEFAULT_AUTO_SYNC_INTERVAL_MINUTES
        } else {
            interval_minutes
        };
        let period = Duration::from_secs(u64::from(interval_minutes) * 60);
        self.start_every(interval_minutes, period)?;
        info!(interval_minutes, "auto sync timer started");
        Ok(())
    }

    fn start_every(&self, interval_minutes: u32, period: Duration) -> Result<()> {
        let handle = Handle::try_current().map_err(|_| {
            AppError::Message("auto sync timer needs a tokio runtime".to_string())
        })?;
        self.stop();
        let (stop, stopped) = oneshot::channel();
        handle.spawn(self.clone().run_timer(period, stopped));
        *lock(&self.timer) = Some(Timer {
            interval_minutes,
            stop,
        });
        Ok(())
    }

    /// Stops the timer. A run already in flight finishes on its own.
    /// Returns whether a timer was active.
    pub fn stop(&self) -> bool {
        let Some(timer) = lock(&self.timer).take() else {
            return false;
        };
        let _ = timer.stop.send(());
        info!("auto sync timer stopped");
        true
    }

    /// Stops any timer, then starts one only if `config` enables auto sync.
    pub fn restart(&self, config: &SyncConfig) -> Result<()> {
        self.stop();
        if config.auto_sync_enabled {
            self.start(config.auto_sync_interval_minutes)?;
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        lock(&self.timer).is_some()
    }

    pub fn interval_minutes(&self) -> Option<u32> {
        lock(&self.timer).as_ref().map(|timer| timer.interval_minutes)
    }

    pub fn status(&self) -> SyncRunState {
        self.tracker.snapshot()
    }

    pub fn tracker(&self) -> &RunTracker {
        &self.tracker
    }

    /// One scheduled run. Blocks on network and store I/O.
    pub fn tick(&self) -> TickOutcome {
        let Some(guard) = self.tracker.try_begin() else {
            warn!("scheduled sync still running; tick dropped");
            return TickOutcome::Dropped;
        };
        let result = match self.sync.run_scheduled() {
            Ok(run) => {
                info!(result = %run.summary(), "scheduled sync finished");
                run.summary()
            }
            Err(err) => {
                error!(error = %err, "scheduled sync failed");
                format!("Error: {err}")
            }
        };
        guard.finish(result.clone());
        TickOutcome::Recorded(result)
    }

    async fn run_timer(self, period: Duration, mut stopped: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let scheduler = self.clone();
                    tokio::task::spawn_blocking(move || scheduler.tick());
                }
                _ = &mut stopped => break,
            }
        }
    }
}
