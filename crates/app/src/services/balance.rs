use chrono::{DateTime, Local};
use feed_sync::PointsInfo;
use points_core::{PointsBalance, current_cycle_for};
use points_db::Db;

use crate::app::SharedFeed;
use crate::error::{AppError, Result};
use crate::services::{SharedConfig, open_db};

const MICROS_PER_DAY: f64 = 86_400_000_000.0;
/// Reported when nothing was spent in the cycle so far.
const UNBOUNDED_REMAINING_DAYS: i64 = 999;

#[derive(Clone)]
pub struct BalanceService {
    config: SharedConfig,
    feed: SharedFeed,
}

impl BalanceService {
    pub(super) fn new(config: SharedConfig, feed: SharedFeed) -> Self {
        Self { config, feed }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    /// Live balance from the feed combined with this cycle's stored spend.
    /// Performs a blocking request.
    pub fn points_info(&self) -> Result<PointsBalance> {
        self.points_info_at(Local::now())
    }

    pub fn points_info_at(&self, now: DateTime<Local>) -> Result<PointsBalance> {
        let db = self.db()?;
        let config = db
            .load_sync_config()?
            .filter(|config| config.credentials.is_complete())
            .ok_or_else(|| AppError::NotFound("no sync config found".to_string()))?
            .normalized();
        let info = self
            .feed
            .fetch_points_info(&config.credentials.with_defaults())?;
        let cycle = current_cycle_for(config.cycle_start_day, now);
        let spent = db.points_since(cycle.start_micros())?;
        Ok(compute_balance(
            &info,
            spent,
            cycle.start_micros(),
            now.timestamp_micros(),
        ))
    }
}

/// Derives usage figures from the feed balance and the points spent since
/// `cycle_start` (both timestamps in microseconds).
pub fn compute_balance(
    info: &PointsInfo,
    spent_in_cycle: i64,
    cycle_start: i64,
    now: i64,
) -> PointsBalance {
    let used_points = info.total_allotment - info.balance;
    let usage_percentage = if info.total_allotment > 0 {
        used_points as f64 / info.total_allotment as f64 * 100.0
    } else {
        0.0
    };
    let elapsed_days = ((now - cycle_start) as f64 / MICROS_PER_DAY).max(1.0);
    let avg_per_day = (spent_in_cycle as f64 / elapsed_days) as i64;
    let remaining_days = if avg_per_day > 0 {
        info.balance / avg_per_day
    } else {
        UNBOUNDED_REMAINING_DAYS
    };
    PointsBalance {
        total_allotment: info.total_allotment,
        current_balance: info.balance,
        used_points,
        usage_percentage,
        avg_per_day,
        remaining_days,
        next_grant_time: info.next_grant_time,
        expires_time: info.expires_time,
        subscription_product: info.product_name.clone(),
    }
}
