use points_core::{AggregateBucket, SyncRunState};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct FetchResponse {
    pub message: String,
    pub new_records: usize,
    pub updated_records: usize,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub data: Vec<AggregateBucket>,
    pub period_start: i64,
    pub period_end: i64,
    pub period_label: String,
}

#[derive(Debug, Serialize)]
pub struct RunStatusResponse {
    pub is_running: bool,
    pub last_fetch_time: Option<String>,
    pub last_fetch_result: String,
    pub timer_active: bool,
    pub interval_minutes: Option<u32>,
}

impl RunStatusResponse {
    pub fn new(state: SyncRunState, interval_minutes: Option<u32>) -> Self {
        Self {
            is_running: state.running,
            last_fetch_time: state.last_run_at,
            last_fetch_result: state.last_run_result,
            timer_active: interval_minutes.is_some(),
            interval_minutes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
