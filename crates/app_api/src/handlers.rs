use points_app::{AppError, Result};
use points_core::{
    BotStat, ChartMode, FeedCredentials, Granularity, PointsBalance, SyncConfig, UsageEvent,
};

use crate::{
    AppContext, ConfigPutRequest, FetchRequest, FetchResponse, MessageResponse, RecordsRequest,
    RunStatusResponse, StatsRequest, StatsResponse,
};

const MAX_RECORD_LIMIT: u32 = 1000;

fn parse_granularity(value: Option<String>) -> Result<Granularity> {
    let value = value.unwrap_or_else(|| "hour".to_string());
    Granularity::parse(&value)
        .ok_or_else(|| AppError::InvalidInput(format!("unsupported granularity {}", value)))
}

fn parse_mode(value: Option<String>) -> Result<ChartMode> {
    let value = value.unwrap_or_else(|| "discrete".to_string());
    ChartMode::parse(&value)
        .ok_or_else(|| AppError::InvalidInput(format!("unsupported chart type {}", value)))
}

/// Runs a manual sync. Blocks on the remote feed.
pub fn fetch(ctx: &AppContext, req: FetchRequest) -> Result<FetchResponse> {
    let credentials = FeedCredentials {
        cookie: req.cookie,
        form_key: req.form_key,
        channel: req.tchannel,
        revision: req.revision,
        tag_id: req.tag_id,
    };
    let stats = ctx.app_state.services.sync.manual(
        credentials,
        req.subscription_day.unwrap_or(0),
        req.full_sync,
    )?;
    Ok(FetchResponse {
        message: stats.message(),
        new_records: stats.new_records,
        updated_records: stats.updated_records,
    })
}

pub fn stats(ctx: &AppContext, req: StatsRequest) -> Result<StatsResponse> {
    let granularity = parse_granularity(req.granularity)?;
    let mode = parse_mode(req.mode)?;
    let aggregate = ctx.app_state.services.analytics.aggregate(
        granularity,
        mode,
        req.period.unwrap_or(0),
    )?;
    Ok(StatsResponse {
        data: aggregate.buckets,
        period_start: aggregate.cycle_start,
        period_end: aggregate.cycle_end,
        period_label: aggregate.label,
    })
}

pub fn records(ctx: &AppContext, req: RecordsRequest) -> Result<Vec<UsageEvent>> {
    let limit = req.limit.map(|limit| limit.clamp(1, MAX_RECORD_LIMIT));
    ctx.app_state.services.analytics.records(limit)
}

pub fn bot_stats(ctx: &AppContext) -> Result<Vec<BotStat>> {
    ctx.app_state.services.analytics.bot_stats()
}

pub fn config_get(ctx: &AppContext) -> Result<SyncConfig> {
    ctx.app_state.services.settings.get()
}

pub fn config_put(ctx: &AppContext, req: ConfigPutRequest) -> Result<MessageResponse> {
    let config = SyncConfig {
        credentials: FeedCredentials {
            cookie: req.cookie,
            form_key: req.form_key,
            channel: req.tchannel,
            revision: req.revision,
            tag_id: req.tag_id,
        },
        cycle_start_day: req.subscription_day,
        auto_sync_interval_minutes: req.auto_fetch_interval,
        auto_sync_enabled: req.auto_fetch_enabled,
        updated_at: None,
    };
    ctx.app_state.services.settings.save(config)?;
    Ok(MessageResponse {
        message: "Configuration saved".to_string(),
    })
}

pub fn auto_sync_status(ctx: &AppContext) -> RunStatusResponse {
    let scheduler = &ctx.app_state.services.scheduler;
    RunStatusResponse::new(scheduler.status(), scheduler.interval_minutes())
}

/// Live balance. Blocks on the remote feed.
pub fn points_info(ctx: &AppContext) -> Result<PointsBalance> {
    ctx.app_state.services.balance.points_info()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granularity_defaults_to_hour_and_rejects_unknown() {
        assert_eq!(parse_granularity(None).expect("default"), Granularity::Hour);
        assert_eq!(
            parse_granularity(Some("halfday".to_string())).expect("halfday"),
            Granularity::HalfDay
        );
        let err = parse_granularity(Some("week".to_string())).expect_err("week");
        assert!(matches!(err, AppError::InvalidInput(message) if message.contains("week")));
    }

    #[test]
    fn chart_mode_defaults_to_discrete() {
        assert_eq!(parse_mode(None).expect("default"), ChartMode::Discrete);
        assert!(parse_mode(Some("stacked".to_string())).is_err());
    }

    #[test]
    fn stats_request_reads_type_field() {
        let req: StatsRequest =
            serde_json::from_str(r#"{"granularity":"day","type":"cumulative","period":-1}"#)
                .expect("request");
        assert_eq!(req.mode.as_deref(), Some("cumulative"));
        assert_eq!(req.period, Some(-1));
    }

    #[test]
    fn fetch_request_tolerates_missing_optional_fields() {
        let req: FetchRequest =
            serde_json::from_str(r#"{"cookie":"c","form_key":"f","tchannel":"t"}"#)
                .expect("request");
        assert!(req.revision.is_empty());
        assert!(req.subscription_day.is_none());
        assert!(!req.full_sync);
    }
}
