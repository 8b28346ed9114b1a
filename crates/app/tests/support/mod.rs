#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use feed_sync::{FeedError, FeedEvent, FeedPage, FeedResult, PointsFeed, PointsInfo};
use points_app::{AppConfig, AppState};
use points_core::{FeedCredentials, UsageEvent, recorded_at_from_micros};
use tempfile::TempDir;

/// In-memory feed: serves `pages` in order, then empty pages.
#[derive(Default)]
pub struct FakeFeed {
    pub pages: Mutex<Vec<FeedPage>>,
    pub info: Mutex<Option<PointsInfo>>,
    pub requests: Mutex<Vec<Option<String>>>,
}

impl FakeFeed {
    pub fn with_pages(pages: Vec<FeedPage>) -> Self {
        Self {
            pages: Mutex::new(pages),
            ..Self::default()
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("requests").len()
    }
}

impl PointsFeed for FakeFeed {
    fn fetch_page(
        &self,
        _credentials: &FeedCredentials,
        cursor: Option<&str>,
    ) -> FeedResult<FeedPage> {
        let mut requests = self.requests.lock().expect("requests");
        let index = requests.len();
        requests.push(cursor.map(str::to_string));
        Ok(self
            .pages
            .lock()
            .expect("pages")
            .get(index)
            .cloned()
            .unwrap_or_default())
    }

    fn fetch_points_info(&self, _credentials: &FeedCredentials) -> FeedResult<PointsInfo> {
        self.info
            .lock()
            .expect("info")
            .clone()
            .ok_or_else(|| FeedError::Status { status: 401 })
    }
}

pub struct TestApp {
    pub _dir: TempDir,
    pub state: AppState,
    pub feed: Arc<FakeFeed>,
}

pub fn setup_app(feed: FakeFeed) -> TestApp {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = AppConfig::new(dir.path().join("app.sqlite"));
    config.page_delay = Duration::ZERO;
    let feed = Arc::new(feed);
    let state = AppState::with_feed(config, feed.clone());
    state.initialize().expect("initialize");
    TestApp {
        _dir: dir,
        state,
        feed,
    }
}

pub fn local(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .earliest()
        .expect("local time")
}

pub fn credentials() -> FeedCredentials {
    FeedCredentials {
        cookie: "p-b=abc".to_string(),
        form_key: "fk".to_string(),
        channel: "chan".to_string(),
        revision: String::new(),
        tag_id: String::new(),
    }
}

pub fn feed_event(id: &str, at: DateTime<Local>, point_cost: i64) -> FeedEvent {
    FeedEvent {
        id: id.to_string(),
        point_cost,
        creation_time: at.timestamp_micros(),
        bot_name: "Claude-Sonnet".to_string(),
        bot_id: "bot-1".to_string(),
        cursor: format!("edge-{id}"),
    }
}

pub fn usage_event(id: &str, at: DateTime<Local>, point_cost: i64, bot: &str) -> UsageEvent {
    let creation_time = at.timestamp_micros();
    UsageEvent {
        id: id.to_string(),
        point_cost,
        creation_time,
        bot_name: bot.to_string(),
        bot_id: format!("bot-{bot}"),
        cursor: format!("cursor-{id}"),
        recorded_at: recorded_at_from_micros(creation_time).expect("recorded at"),
    }
}
