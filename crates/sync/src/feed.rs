use points_core::{FeedCredentials, UsageEvent, recorded_at_from_micros};
use serde::Serialize;

use crate::types::FeedResult;

/// One usage record as delivered by the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEvent {
    pub id: String,
    pub point_cost: i64,
    pub creation_time: i64,
    pub bot_name: String,
    pub bot_id: String,
    /// Pagination token of the edge this event came from.
    pub cursor: String,
}

impl FeedEvent {
    /// Stored form of the event; `None` when the creation time is outside
    /// the representable range.
    pub fn to_usage_event(&self) -> Option<UsageEvent> {
        Some(UsageEvent {
            id: self.id.clone(),
            point_cost: self.point_cost,
            creation_time: self.creation_time,
            bot_name: self.bot_name.clone(),
            bot_id: self.bot_id.clone(),
            cursor: self.cursor.clone(),
            recorded_at: recorded_at_from_micros(self.creation_time)?,
        })
    }
}

/// One page of history, newest event first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedPage {
    pub events: Vec<FeedEvent>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Account-level point balance reported by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointsInfo {
    pub total_allotment: i64,
    pub balance: i64,
    pub next_grant_time: Option<i64>,
    pub expires_time: Option<i64>,
    pub product_name: Option<String>,
}

/// Remote source of usage history.
///
/// Implementations must keep transport and parse failures distinct from an
/// exhausted feed: the last page is `Ok` with `has_more == false`.
pub trait PointsFeed: Send + Sync {
    /// Fetches one page. `cursor` is `None` for the first page.
    fn fetch_page(&self, credentials: &FeedCredentials, cursor: Option<&str>)
    -> FeedResult<FeedPage>;

    fn fetch_points_info(&self, credentials: &FeedCredentials) -> FeedResult<PointsInfo>;
}
