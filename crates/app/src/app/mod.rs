use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use feed_sync::{DEFAULT_ENDPOINT, HttpFeed, PointsFeed, SyncError};
use points_db::Db;
use tracing::info;

use crate::error::{AppError, Result};
use crate::services::AppServices;

pub type SharedFeed = Arc<dyn PointsFeed>;

pub const DEFAULT_FEED_ENDPOINT: &str = DEFAULT_ENDPOINT;

const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(1);

/// Paths and remote settings needed to run the local monitor.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub feed_endpoint: String,
    /// Pause between consecutive feed pages.
    pub page_delay: Duration,
}

impl AppConfig {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            feed_endpoint: DEFAULT_FEED_ENDPOINT.to_string(),
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }
}

/// Application state shared by the HTTP surface and the scheduler.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    /// Builds state backed by the HTTP feed. The feed wraps a blocking
    /// client, so call this outside of an async context.
    pub fn new(config: AppConfig) -> Result<Self> {
        let feed = HttpFeed::new(config.feed_endpoint.clone()).map_err(SyncError::from)?;
        Ok(Self::with_feed(config, Arc::new(feed)))
    }

    pub fn with_feed(config: AppConfig, feed: SharedFeed) -> Self {
        let services = AppServices::new(&config, feed);
        Self { config, services }
    }

    pub fn setup_db(&self) -> Result<()> {
        setup_db(&self.config.db_path)
    }

    pub fn initialize(&self) -> Result<()> {
        self.setup_db()
            .map_err(|err| AppError::Message(format!("initialize db: {}", err)))?;
        let records = self.open_db()?.count_records()?;
        info!(db = %self.config.db_path.display(), records, "database ready");
        Ok(())
    }

    pub fn open_db(&self) -> Result<Db> {
        Ok(Db::open(&self.config.db_path)?)
    }

    /// Starts or stops the auto-sync timer to match the stored configuration.
    pub fn start_scheduler(&self) -> Result<()> {
        self.services.settings.restart_scheduler()
    }
}

pub fn setup_db(path: &Path) -> Result<()> {
    let mut db = Db::open(path)?;
    db.migrate()?;
    Ok(())
}
