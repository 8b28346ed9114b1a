use chrono::{DateTime, Local};
use points_core::{
    BotStat, ChartMode, CycleAggregate, Granularity, UsageEvent, accumulate, cycle_with_offset,
};
use points_db::Db;

use crate::error::Result;
use crate::services::{SharedConfig, open_db};

pub const DEFAULT_RECORD_LIMIT: u32 = 20;

#[derive(Clone)]
pub struct AnalyticsService {
    config: SharedConfig,
}

impl AnalyticsService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    pub fn aggregate(
        &self,
        granularity: Granularity,
        mode: ChartMode,
        cycle_offset: i32,
    ) -> Result<CycleAggregate> {
        self.aggregate_at(Local::now(), granularity, mode, cycle_offset)
    }

    /// Bucketed usage for the cycle `cycle_offset` months away from the one
    /// running at `now`.
    pub fn aggregate_at(
        &self,
        now: DateTime<Local>,
        granularity: Granularity,
        mode: ChartMode,
        cycle_offset: i32,
    ) -> Result<CycleAggregate> {
        let db = self.db()?;
        let cycle_start_day = db
            .load_sync_config()?
            .unwrap_or_default()
            .normalized()
            .cycle_start_day;
        let period = cycle_with_offset(now, cycle_start_day, cycle_offset);
        let buckets =
            db.range_grouped_sum(period.start_micros(), period.end_micros(), granularity)?;
        let buckets = match mode {
            ChartMode::Discrete => buckets,
            ChartMode::Cumulative => accumulate(buckets),
        };
        Ok(CycleAggregate {
            buckets,
            cycle_start: period.start_micros(),
            cycle_end: period.end_micros(),
            label: period.label(),
        })
    }

    pub fn records(&self, limit: Option<u32>) -> Result<Vec<UsageEvent>> {
        let db = self.db()?;
        Ok(db.recent_records(limit.unwrap_or(DEFAULT_RECORD_LIMIT))?)
    }

    pub fn bot_stats(&self) -> Result<Vec<BotStat>> {
        let db = self.db()?;
        Ok(db.bot_stats()?)
    }
}
