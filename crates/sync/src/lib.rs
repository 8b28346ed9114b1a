mod feed;
mod http;
mod pipeline;
mod types;
mod wire;

pub use feed::{FeedEvent, FeedPage, PointsFeed, PointsInfo};
pub use http::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, HttpFeed, PAGE_SIZE};
pub use pipeline::sync_points;
pub use types::{
    FeedError, FeedResult, Result, SCHEDULED_PAGE_BUDGET, StopReason, SyncError, SyncRequest,
    SyncStats,
};
