use chrono::Local;
use feed_sync::{SyncRequest, SyncStats, sync_points};
use points_core::{FeedCredentials, SyncConfig, normalize_cycle_day};
use points_db::Db;

use crate::app::SharedFeed;
use crate::error::{AppError, Result};
use crate::services::{SharedConfig, open_db};

/// Outcome of one timer-driven sync attempt.
#[derive(Debug, Clone)]
pub enum ScheduledRun {
    Skipped(&'static str),
    Completed(SyncStats),
}

impl ScheduledRun {
    pub fn summary(&self) -> String {
        match self {
            Self::Skipped(reason) => (*reason).to_string(),
            Self::Completed(stats) => format!("Success: {} new records", stats.new_records),
        }
    }
}

#[derive(Clone)]
pub struct SyncService {
    config: SharedConfig,
    feed: SharedFeed,
}

impl SyncService {
    pub(super) fn new(config: SharedConfig, feed: SharedFeed) -> Self {
        Self { config, feed }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    /// User-triggered sync. The credentials and cycle day become the stored
    /// configuration before any request is made; auto-sync settings are kept.
    pub fn manual(
        &self,
        credentials: FeedCredentials,
        cycle_start_day: u32,
        full_sync: bool,
    ) -> Result<SyncStats> {
        if !credentials.is_complete() {
            return Err(AppError::InvalidInput(
                "cookie, formkey and tchannel are required".to_string(),
            ));
        }
        let credentials = credentials.with_defaults();
        let cycle_start_day = normalize_cycle_day(cycle_start_day);

        let mut db = self.db()?;
        let stored = db.load_sync_config()?.unwrap_or_default();
        let config = SyncConfig {
            credentials: credentials.clone(),
            cycle_start_day,
            ..stored
        };
        db.upsert_sync_config(&config)?;

        let request = SyncRequest::manual(credentials, cycle_start_day, full_sync)
            .with_page_delay(self.config.page_delay);
        Ok(sync_points(&db, self.feed.as_ref(), &request, Local::now())?)
    }

    /// Incremental, page-capped sync using the stored configuration.
    pub fn run_scheduled(&self) -> Result<ScheduledRun> {
        let db = self.db()?;
        let config = match db.load_sync_config()? {
            Some(config) if config.auto_sync_enabled => config.normalized(),
            _ => return Ok(ScheduledRun::Skipped("Disabled or no config")),
        };
        if !config.credentials.is_complete() {
            return Ok(ScheduledRun::Skipped("Invalid config"));
        }
        let request =
            SyncRequest::scheduled(config.credentials.with_defaults(), config.cycle_start_day)
                .with_page_delay(self.config.page_delay);
        let stats = sync_points(&db, self.feed.as_ref(), &request, Local::now())?;
        Ok(ScheduledRun::Completed(stats))
    }
}
