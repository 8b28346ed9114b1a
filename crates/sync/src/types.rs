use std::time::Duration;

use points_core::{FeedCredentials, normalize_cycle_day};
use serde::Serialize;

/// Page cap for timer-driven incremental runs.
pub const SCHEDULED_PAGE_BUDGET: u32 = 10;

const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(1);

/// Failures talking to the remote feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Transport(String),
    #[error("feed request timed out after {0}s")]
    Timeout(u64),
    #[error("feed returned HTTP {status}")]
    Status { status: u16 },
    #[error("unexpected feed response: {0}")]
    Parse(String),
}

impl FeedError {
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

pub type FeedResult<T> = std::result::Result<T, FeedError>;

/// Errors that abort a sync run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("db error: {0}")]
    Db(#[from] points_db::DbError),
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// Parameters of one sync run.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub credentials: FeedCredentials,
    pub cycle_start_day: u32,
    /// Update rows that already exist instead of stopping at the first one.
    pub full_sync: bool,
    /// Maximum pages to request; `None` means no cap.
    pub page_budget: Option<u32>,
    pub page_delay: Duration,
}

impl SyncRequest {
    /// User-triggered run: no page cap.
    pub fn manual(credentials: FeedCredentials, cycle_start_day: u32, full_sync: bool) -> Self {
        Self {
            credentials,
            cycle_start_day: normalize_cycle_day(cycle_start_day),
            full_sync,
            page_budget: None,
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }

    /// Timer-driven run: incremental and capped at `SCHEDULED_PAGE_BUDGET` pages.
    pub fn scheduled(credentials: FeedCredentials, cycle_start_day: u32) -> Self {
        Self {
            credentials,
            cycle_start_day: normalize_cycle_day(cycle_start_day),
            full_sync: false,
            page_budget: Some(SCHEDULED_PAGE_BUDGET),
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }
}

/// Why the page loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    ReachedCycleStart,
    DuplicateFound,
    FeedExhausted,
    PageBudgetExhausted,
}

/// Summary returned after a sync run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncStats {
    pub new_records: usize,
    pub updated_records: usize,
    pub skipped_records: usize,
    pub pages_fetched: usize,
    pub stop_reason: Option<StopReason>,
}

impl SyncStats {
    pub fn message(&self) -> String {
        if self.updated_records > 0 {
            format!(
                "Fetched {} new records, updated {} existing records",
                self.new_records, self.updated_records
            )
        } else {
            format!("Fetched {} new records", self.new_records)
        }
    }
}
