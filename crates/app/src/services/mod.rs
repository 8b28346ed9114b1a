mod analytics;
mod balance;
mod settings;
mod sync;

use std::sync::Arc;

use crate::app::{AppConfig, SharedFeed};
use crate::error::Result;
use crate::scheduler::Scheduler;
use points_db::Db;

pub use analytics::{AnalyticsService, DEFAULT_RECORD_LIMIT};
pub use balance::{BalanceService, compute_balance};
pub use settings::SettingsService;
pub use sync::{ScheduledRun, SyncService};

type SharedConfig = Arc<AppConfig>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub analytics: AnalyticsService,
    pub balance: BalanceService,
    pub settings: SettingsService,
    pub sync: SyncService,
    pub scheduler: Scheduler,
}

impl AppServices {
    pub fn new(config: &AppConfig, feed: SharedFeed) -> Self {
        let shared = Arc::new(config.clone());
        let sync = SyncService::new(shared.clone(), feed.clone());
        let scheduler = Scheduler::new(sync.clone());
        Self {
            analytics: AnalyticsService::new(shared.clone()),
            balance: BalanceService::new(shared.clone(), feed),
            settings: SettingsService::new(shared, scheduler.clone()),
            sync,
            scheduler,
        }
    }
}

fn open_db(config: &SharedConfig) -> Result<Db> {
    Ok(Db::open(&config.db_path)?)
}
