use points_core::{AggregateBucket, BotStat, FeedCredentials, SyncConfig, UsageEvent};
use rusqlite::Row;

pub(crate) const USAGE_EVENT_COLUMNS: &str =
    "id, point_cost, creation_time, bot_name, bot_id, cursor, recorded_at";

pub(crate) fn row_to_usage_event(
    row: &Row<'_>,
) -> std::result::Result<UsageEvent, rusqlite::Error> {
    Ok(UsageEvent {
        id: row.get(0)?,
        point_cost: row.get(1)?,
        creation_time: row.get(2)?,
        bot_name: row.get(3)?,
        bot_id: row.get(4)?,
        cursor: row.get(5)?,
        recorded_at: row.get(6)?,
    })
}

pub(crate) fn row_to_bucket(row: &Row<'_>) -> std::result::Result<AggregateBucket, rusqlite::Error> {
    Ok(AggregateBucket {
        bucket: row.get(0)?,
        point_cost: row.get(1)?,
        record_count: row.get(2)?,
    })
}

pub(crate) fn row_to_bot_stat(row: &Row<'_>) -> std::result::Result<BotStat, rusqlite::Error> {
    Ok(BotStat {
        bot_name: row.get(0)?,
        total_cost: row.get(1)?,
        count: row.get(2)?,
    })
}

pub(crate) fn row_to_sync_config(row: &Row<'_>) -> std::result::Result<SyncConfig, rusqlite::Error> {
    Ok(SyncConfig {
        credentials: FeedCredentials {
            cookie: row.get(0)?,
            form_key: row.get(1)?,
            channel: row.get(2)?,
            revision: row.get(3)?,
            tag_id: row.get(4)?,
        },
        cycle_start_day: row.get::<_, i64>(5)?.clamp(0, i64::from(u32::MAX)) as u32,
        auto_sync_interval_minutes: row.get::<_, i64>(6)?.clamp(0, i64::from(u32::MAX)) as u32,
        auto_sync_enabled: row.get::<_, i64>(7)? != 0,
        updated_at: row.get(8)?,
    })
}
