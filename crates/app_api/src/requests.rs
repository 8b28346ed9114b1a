use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct EmptyRequest {}

/// Manual sync trigger. Revision and tag id fall back to built-in values.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FetchRequest {
    pub cookie: String,
    pub form_key: String,
    pub tchannel: String,
    pub revision: String,
    pub tag_id: String,
    pub subscription_day: Option<u32>,
    pub full_sync: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct StatsRequest {
    pub granularity: Option<String>,
    #[serde(rename = "type")]
    pub mode: Option<String>,
    /// Cycle offset from the running one; 0 is current, -1 the previous.
    pub period: Option<i32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RecordsRequest {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ConfigPutRequest {
    pub cookie: String,
    pub form_key: String,
    pub tchannel: String,
    pub revision: String,
    pub tag_id: String,
    pub subscription_day: u32,
    pub auto_fetch_interval: u32,
    pub auto_fetch_enabled: bool,
}
