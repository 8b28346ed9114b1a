use points_core::UsageEvent;
use rusqlite::params;

use crate::Db;
use crate::error::Result;
use crate::helpers::{USAGE_EVENT_COLUMNS, row_to_usage_event};

impl Db {
    pub fn record_exists(&self, id: &str) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM points_history WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Inserts `event` unless its id is already stored. Returns whether a row
    /// was written.
    pub fn insert_record(&self, event: &UsageEvent) -> Result<bool> {
        let inserted = self.conn.execute(
            r#"
            INSERT INTO points_history (
              id, point_cost, creation_time, bot_name, bot_id, cursor, recorded_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO NOTHING
            "#,
            params![
                event.id,
                event.point_cost,
                event.creation_time,
                event.bot_name,
                event.bot_id,
                event.cursor,
                event.recorded_at,
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Overwrites the mutable fields of an existing row. Returns false when no
    /// row carries `event.id`.
    pub fn update_record(&self, event: &UsageEvent) -> Result<bool> {
        let changed = self.conn.execute(
            r#"
            UPDATE points_history
            SET point_cost = ?2, creation_time = ?3, bot_name = ?4, bot_id = ?5,
                cursor = ?6, recorded_at = ?7
            WHERE id = ?1
            "#,
            params![
                event.id,
                event.point_cost,
                event.creation_time,
                event.bot_name,
                event.bot_id,
                event.cursor,
                event.recorded_at,
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn get_record(&self, id: &str) -> Result<Option<UsageEvent>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM points_history WHERE id = ?1",
            USAGE_EVENT_COLUMNS
        ))?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row_to_usage_event(row)?))
        } else {
            Ok(None)
        }
    }

    /// Most recent records first.
    pub fn recent_records(&self, limit: u32) -> Result<Vec<UsageEvent>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM points_history ORDER BY creation_time DESC, id DESC LIMIT ?1",
            USAGE_EVENT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![limit], row_to_usage_event)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn count_records(&self) -> Result<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM points_history", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}
