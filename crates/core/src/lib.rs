mod period;

use chrono::{DateTime, Local, SecondsFormat, Timelike};
use serde::{Deserialize, Serialize};

pub use period::{
    CyclePeriod, current_cycle_for, cycle_period, cycle_with_offset, days_in_month,
    normalize_cycle_day, shift_month,
};

pub const DEFAULT_CYCLE_START_DAY: u32 = 1;
pub const DEFAULT_AUTO_SYNC_INTERVAL_MINUTES: u32 = 30;
pub const DEFAULT_REVISION: &str = "59988163982a4ac4be7c7e7784f006dc48cafcf5";
pub const DEFAULT_TAG_ID: &str = "8a0df086c2034f5e97dcb01c426029ee";

/// One billed action as stored locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub id: String,
    pub point_cost: i64,
    /// Microseconds since the Unix epoch, as reported by the feed.
    pub creation_time: i64,
    pub bot_name: String,
    pub bot_id: String,
    pub cursor: String,
    pub recorded_at: String,
}

/// Opaque credential bundle forwarded to the remote feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedCredentials {
    pub cookie: String,
    pub form_key: String,
    #[serde(rename = "tchannel")]
    pub channel: String,
    pub revision: String,
    pub tag_id: String,
}

impl FeedCredentials {
    pub fn is_complete(&self) -> bool {
        !self.cookie.trim().is_empty()
            && !self.form_key.trim().is_empty()
            && !self.channel.trim().is_empty()
    }

    /// Fills blank revision/tag headers with the built-in values.
    pub fn with_defaults(mut self) -> Self {
        if self.revision.trim().is_empty() {
            self.revision = DEFAULT_REVISION.to_string();
        }
        if self.tag_id.trim().is_empty() {
            self.tag_id = DEFAULT_TAG_ID.to_string();
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(flatten)]
    pub credentials: FeedCredentials,
    #[serde(rename = "subscription_day")]
    pub cycle_start_day: u32,
    #[serde(rename = "auto_fetch_interval")]
    pub auto_sync_interval_minutes: u32,
    #[serde(rename = "auto_fetch_enabled")]
    pub auto_sync_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            credentials: FeedCredentials::default().with_defaults(),
            cycle_start_day: DEFAULT_CYCLE_START_DAY,
            auto_sync_interval_minutes: DEFAULT_AUTO_SYNC_INTERVAL_MINUTES,
            auto_sync_enabled: false,
            updated_at: None,
        }
    }
}

impl SyncConfig {
    pub fn normalized(mut self) -> Self {
        self.cycle_start_day = normalize_cycle_day(self.cycle_start_day);
        if self.auto_sync_interval_minutes == 0 {
            self.auto_sync_interval_minutes = DEFAULT_AUTO_SYNC_INTERVAL_MINUTES;
        }
        self
    }
}

/// Process-wide scheduler bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRunState {
    pub running: bool,
    pub last_run_at: Option<String>,
    pub last_run_result: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateBucket {
    #[serde(rename = "timestamp")]
    pub bucket: String,
    pub point_cost: i64,
    pub record_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleAggregate {
    pub buckets: Vec<AggregateBucket>,
    pub cycle_start: i64,
    pub cycle_end: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotStat {
    pub bot_name: String,
    pub total_cost: i64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsBalance {
    pub total_allotment: i64,
    pub current_balance: i64,
    pub used_points: i64,
    pub usage_percentage: f64,
    pub avg_per_day: i64,
    pub remaining_days: i64,
    pub next_grant_time: Option<i64>,
    pub expires_time: Option<i64>,
    pub subscription_product: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Minute,
    Hour,
    HalfDay,
    Day,
}

impl Granularity {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "minute" => Some(Self::Minute),
            "hour" => Some(Self::Hour),
            "halfday" | "half-day" | "half_day" => Some(Self::HalfDay),
            "day" => Some(Self::Day),
            _ => None,
        }
    }

    /// Bucket key for a local instant. Keys sort lexicographically in time order.
    pub fn bucket_label(self, instant: &DateTime<Local>) -> String {
        match self {
            Self::Minute => instant.format("%Y-%m-%d %H:%M").to_string(),
            Self::Hour => instant.format("%Y-%m-%d %H:00").to_string(),
            Self::HalfDay => {
                let half = if instant.hour() < 12 { "AM" } else { "PM" };
                format!("{} {}", instant.format("%Y-%m-%d"), half)
            }
            Self::Day => instant.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    Discrete,
    Cumulative,
}

impl ChartMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "discrete" => Some(Self::Discrete),
            "cumulative" => Some(Self::Cumulative),
            _ => None,
        }
    }
}

/// Replaces each bucket's values with the running totals up to and including it.
pub fn accumulate(buckets: Vec<AggregateBucket>) -> Vec<AggregateBucket> {
    let mut point_cost = 0i64;
    let mut record_count = 0i64;
    buckets
        .into_iter()
        .map(|bucket| {
            point_cost = point_cost.saturating_add(bucket.point_cost);
            record_count = record_count.saturating_add(bucket.record_count);
            AggregateBucket {
                bucket: bucket.bucket,
                point_cost,
                record_count,
            }
        })
        .collect()
}

/// Ingestion timestamp: the creation time truncated to whole seconds, RFC 3339
/// in local time with its offset.
pub fn recorded_at_from_micros(creation_time: i64) -> Option<String> {
    DateTime::from_timestamp(creation_time.div_euclid(1_000_000), 0).map(|value| {
        value
            .with_timezone(&Local)
            .to_rfc3339_opts(SecondsFormat::Secs, false)
    })
}
