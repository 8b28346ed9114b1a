use points_core::SyncConfig;
use points_db::Db;

use crate::error::Result;
use crate::scheduler::Scheduler;
use crate::services::{SharedConfig, open_db};

#[derive(Clone)]
pub struct SettingsService {
    config: SharedConfig,
    scheduler: Scheduler,
}

impl SettingsService {
    pub(super) fn new(config: SharedConfig, scheduler: Scheduler) -> Self {
        Self { config, scheduler }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    /// Stored configuration, or defaults when nothing was saved yet.
    pub fn get(&self) -> Result<SyncConfig> {
        let db = self.db()?;
        Ok(db
            .load_sync_config()?
            .map(SyncConfig::normalized)
            .unwrap_or_default())
    }

    /// Replaces the stored configuration and re-arms the auto-sync timer.
    pub fn save(&self, config: SyncConfig) -> Result<SyncConfig> {
        let mut config = config.normalized();
        config.credentials = config.credentials.with_defaults();
        let mut db = self.db()?;
        db.upsert_sync_config(&config)?;
        let saved = db.load_sync_config()?.unwrap_or(config);
        self.scheduler.restart(&saved)?;
        Ok(saved)
    }

    pub fn restart_scheduler(&self) -> Result<()> {
        let config = self.get()?;
        self.scheduler.restart(&config)
    }
}
