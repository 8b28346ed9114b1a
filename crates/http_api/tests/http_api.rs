use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Local;
use feed_sync::{FeedError, FeedEvent, FeedPage, FeedResult, PointsFeed, PointsInfo};
use http_body_util::BodyExt;
use points_core::FeedCredentials;
use serde_json::{Value, json};
use tower::util::ServiceExt;

use app_api::AppContext;
use points_app::{AppConfig, AppPaths, AppState, ensure_app_data_dir};

use http_api::HttpState;

/// Returns one page of fresh events, or fails every request when `failure`
/// is set.
#[derive(Default)]
struct StubFeed {
    events: Vec<FeedEvent>,
    failure: Option<fn() -> FeedError>,
    seen: Mutex<Vec<FeedCredentials>>,
}

impl PointsFeed for StubFeed {
    fn fetch_page(
        &self,
        credentials: &FeedCredentials,
        cursor: Option<&str>,
    ) -> FeedResult<FeedPage> {
        self.seen.lock().expect("seen").push(credentials.clone());
        if let Some(failure) = self.failure {
            return Err(failure());
        }
        let events = if cursor.is_none() {
            self.events.clone()
        } else {
            Vec::new()
        };
        Ok(FeedPage {
            events,
            next_cursor: None,
            has_more: false,
        })
    }

    fn fetch_points_info(&self, _credentials: &FeedCredentials) -> FeedResult<PointsInfo> {
        Ok(PointsInfo {
            total_allotment: 1_000,
            balance: 900,
            next_grant_time: None,
            expires_time: None,
            product_name: None,
        })
    }
}

struct TestApp {
    _temp_dir: tempfile::TempDir,
    router: axum::Router,
    feed: Arc<StubFeed>,
}

fn build_app(feed: StubFeed) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let paths = AppPaths::new(temp_dir.path().to_path_buf());
    ensure_app_data_dir(&paths).expect("ensure app data dir");
    let mut config = AppConfig::new(paths.db_path);
    config.page_delay = Duration::ZERO;
    let feed = Arc::new(feed);
    let app_state = AppState::with_feed(config, feed.clone());
    app_state.setup_db().expect("setup db");

    let context = AppContext {
        app_state,
        app_data_dir: paths.app_data_dir,
    };
    let router = http_api::router(HttpState::new(context));

    TestApp {
        _temp_dir: temp_dir,
        router,
        feed,
    }
}

fn fresh_events(count: i64) -> Vec<FeedEvent> {
    let now = Local::now();
    (0..count)
        .map(|index| FeedEvent {
            id: format!("evt-{index}"),
            point_cost: 10 * (index + 1),
            creation_time: (now - chrono::Duration::seconds(index + 1)).timestamp_micros(),
            bot_name: "Claude-Sonnet".to_string(),
            bot_id: "bot-1".to_string(),
            cursor: format!("c{index}"),
        })
        .collect()
}

async fn post(router: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn fetch_body() -> Value {
    json!({"cookie": "p-b=abc", "form_key": "fk", "tchannel": "chan", "subscription_day": 1})
}

#[tokio::test]
async fn fetch_then_read_records_stats_and_bot_stats() {
    let app = build_app(StubFeed {
        events: fresh_events(3),
        ..StubFeed::default()
    });

    let (status, body) = post(&app.router, "/api/fetch", fetch_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Fetched 3 new records");
    assert_eq!(body["new_records"], 3);

    let seen = app.feed.seen.lock().expect("seen").clone();
    assert_eq!(seen[0].revision, points_core::DEFAULT_REVISION);

    let (status, body) = post(&app.router, "/api/records", json!({"limit": 2})).await;
    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().expect("records");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], "evt-0");

    let (status, body) = post(
        &app.router,
        "/api/stats",
        json!({"granularity": "day", "type": "cumulative"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().expect("data");
    let last = data.last().expect("bucket");
    assert_eq!(last["point_cost"], 60);
    assert_eq!(last["record_count"], 3);
    assert!(body["period_label"].as_str().expect("label").contains(" - "));
    assert!(body["period_start"].as_i64() < body["period_end"].as_i64());

    let (status, body) = post(&app.router, "/api/bot_stats", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["bot_name"], "Claude-Sonnet");
    assert_eq!(body[0]["total_cost"], 60);
}

#[tokio::test]
async fn fetch_without_credentials_is_bad_request() {
    let app = build_app(StubFeed::default());

    let (status, body) = post(&app.router, "/api/fetch", json!({"cookie": "p-b=abc"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");
    assert!(app.feed.seen.lock().expect("seen").is_empty());
}

#[tokio::test]
async fn feed_failures_surface_as_bad_gateway() {
    let app = build_app(StubFeed {
        failure: Some(|| FeedError::Status { status: 403 }),
        ..StubFeed::default()
    });
    let (status, body) = post(&app.router, "/api/fetch", fetch_body()).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "feed_unavailable");

    let app = build_app(StubFeed {
        failure: Some(|| FeedError::Parse("missing pageInfo".to_string())),
        ..StubFeed::default()
    });
    let (status, body) = post(&app.router, "/api/fetch", fetch_body()).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "feed_parse");
}

#[tokio::test]
async fn stats_rejects_unknown_granularity() {
    let app = build_app(StubFeed::default());

    let (status, body) = post(&app.router, "/api/stats", json!({"granularity": "week"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");
}

#[tokio::test]
async fn config_round_trip_and_status() {
    let app = build_app(StubFeed::default());

    let (status, body) = post(&app.router, "/api/config_get", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subscription_day"], 1);
    assert_eq!(body["auto_fetch_interval"], 30);
    assert_eq!(body["auto_fetch_enabled"], false);

    let (status, _) = post(
        &app.router,
        "/api/config_put",
        json!({
            "cookie": "p-b=abc", "form_key": "fk", "tchannel": "chan",
            "subscription_day": 12, "auto_fetch_interval": 10, "auto_fetch_enabled": true
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = post(&app.router, "/api/config_get", json!({})).await;
    assert_eq!(body["subscription_day"], 12);
    assert_eq!(body["tchannel"], "chan");
    assert_eq!(body["auto_fetch_enabled"], true);

    let (status, body) = post(&app.router, "/api/auto_sync_status", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_running"], false);
    assert_eq!(body["timer_active"], true);
    assert_eq!(body["interval_minutes"], 10);
    assert!(body["last_fetch_time"].is_null());
}

#[tokio::test]
async fn points_info_needs_config_then_reports_balance() {
    let app = build_app(StubFeed::default());

    let (status, body) = post(&app.router, "/api/points_info", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, _) = post(&app.router, "/api/fetch", fetch_body()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(&app.router, "/api/points_info", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["used_points"], 100);
    assert_eq!(body["current_balance"], 900);
    assert_eq!(body["remaining_days"], 999);
}
