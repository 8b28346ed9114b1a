//! Blocking GraphQL client for the Poe points endpoints.

use std::time::Duration;

use points_core::FeedCredentials;
use reqwest::blocking::{Client, ClientBuilder};
use serde_json::{Value, json};
use tracing::debug;

use crate::feed::{FeedPage, PointsFeed, PointsInfo};
use crate::types::{FeedError, FeedResult};
use crate::wire::{parse_history_page, parse_points_info};

pub const DEFAULT_ENDPOINT: &str = "https://poe.com/api/gql_POST";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Events requested per history page.
pub const PAGE_SIZE: u32 = 20;

const HISTORY_QUERY: &str = "PointsHistoryPageColumnViewerPaginationQuery";
const HISTORY_QUERY_HASH: &str =
    "9b68fe8ea0017e5d7701c93a5db8323136f9cb023d514f8595ae0dde220be6d1";
const SETTINGS_QUERY: &str = "settingsPageQuery";
const SETTINGS_QUERY_HASH: &str =
    "39ca34ece084fd810ccc8394942a2a584651433a57e7455ae80546a2e7893b5f";

const ORIGIN: &str = "https://poe.com";
const REFERER: &str = "https://poe.com/points_history";
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36";

/// Feed backed by the persisted-query GraphQL endpoint.
///
/// Wraps a blocking client; construct, call and drop it outside of async contexts.
#[derive(Debug, Clone)]
pub struct HttpFeed {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpFeed {
    pub fn new(endpoint: impl Into<String>) -> FeedResult<Self> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> FeedResult<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| FeedError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn post(&self, credentials: &FeedCredentials, query_name: &str, body: &Value) -> FeedResult<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("accept", "*/*")
            .header("content-type", "application/json")
            .header("cookie", &credentials.cookie)
            .header("origin", ORIGIN)
            .header("referer", REFERER)
            .header("poe-formkey", &credentials.form_key)
            .header("poe-queryname", query_name)
            .header("poe-revision", &credentials.revision)
            .header("poe-tag-id", &credentials.tag_id)
            .header("poe-tchannel", &credentials.channel)
            .header("poegraphql", "1")
            .body(body.to_string())
            .send()
            .map_err(|err| self.map_send_error(err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
            });
        }
        response.text().map_err(|err| self.map_send_error(err))
    }

    fn map_send_error(&self, err: reqwest::Error) -> FeedError {
        if err.is_timeout() {
            FeedError::Timeout(self.timeout.as_secs())
        } else {
            FeedError::Transport(err.to_string())
        }
    }
}

fn history_body(cursor: Option<&str>) -> Value {
    let mut variables = json!({ "limit": PAGE_SIZE });
    if let Some(cursor) = cursor.filter(|cursor| !cursor.is_empty()) {
        variables["cursor"] = Value::String(cursor.to_string());
    }
    json!({
        "queryName": HISTORY_QUERY,
        "variables": variables,
        "extensions": { "hash": HISTORY_QUERY_HASH },
    })
}

fn settings_body() -> Value {
    json!({
        "queryName": SETTINGS_QUERY,
        "variables": {},
        "extensions": { "hash": SETTINGS_QUERY_HASH },
    })
}

impl PointsFeed for HttpFeed {
    fn fetch_page(
        &self,
        credentials: &FeedCredentials,
        cursor: Option<&str>,
    ) -> FeedResult<FeedPage> {
        debug!(endpoint = %self.endpoint, has_cursor = cursor.is_some(), "requesting history page");
        let body = self.post(credentials, HISTORY_QUERY, &history_body(cursor))?;
        parse_history_page(&body)
    }

    fn fetch_points_info(&self, credentials: &FeedCredentials) -> FeedResult<PointsInfo> {
        let body = self.post(credentials, SETTINGS_QUERY, &settings_body())?;
        parse_points_info(&body)
    }
}
