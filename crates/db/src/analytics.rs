use points_core::{AggregateBucket, BotStat, Granularity};
use rusqlite::params;

use crate::Db;
use crate::error::Result;
use crate::helpers::{row_to_bot_stat, row_to_bucket};

const LOCAL_TIME: &str = "datetime(creation_time / 1000000, 'unixepoch', 'localtime')";

/// SQL expression producing the same keys as `Granularity::bucket_label`.
fn bucket_expr(granularity: Granularity) -> String {
    match granularity {
        Granularity::Minute => format!("strftime('%Y-%m-%d %H:%M', {LOCAL_TIME})"),
        Granularity::Hour => format!("strftime('%Y-%m-%d %H:00', {LOCAL_TIME})"),
        Granularity::HalfDay => format!(
            "strftime('%Y-%m-%d', {LOCAL_TIME}) || \
             CASE WHEN CAST(strftime('%H', {LOCAL_TIME}) AS INTEGER) < 12 \
             THEN ' AM' ELSE ' PM' END"
        ),
        Granularity::Day => format!("strftime('%Y-%m-%d', {LOCAL_TIME})"),
    }
}

impl Db {
    /// Sums cost and counts records per bucket for `start <= creation_time < end`,
    /// ordered by bucket key.
    pub fn range_grouped_sum(
        &self,
        start_micros: i64,
        end_micros: i64,
        granularity: Granularity,
    ) -> Result<Vec<AggregateBucket>> {
        let sql = format!(
            r#"
            SELECT {} AS bucket, SUM(point_cost), COUNT(*)
            FROM points_history
            WHERE creation_time >= ?1 AND creation_time < ?2
            GROUP BY bucket
            ORDER BY bucket
            "#,
            bucket_expr(granularity)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![start_micros, end_micros], row_to_bucket)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Totals per bot across all stored records, highest spend first.
    pub fn bot_stats(&self) -> Result<Vec<BotStat>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT bot_name, SUM(point_cost) AS total_cost, COUNT(*)
            FROM points_history
            GROUP BY bot_name
            ORDER BY total_cost DESC, bot_name ASC
            "#,
        )?;
        let rows = stmt.query_map([], row_to_bot_stat)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn points_since(&self, since_micros: i64) -> Result<i64> {
        let total: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(point_cost), 0) FROM points_history WHERE creation_time >= ?1",
            params![since_micros],
            |row| row.get(0),
        )?;
        Ok(total)
    }
}
