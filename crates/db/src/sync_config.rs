use chrono::{SecondsFormat, Utc};
use points_core::SyncConfig;
use rusqlite::{OptionalExtension, params};

use crate::Db;
use crate::error::Result;
use crate::helpers::row_to_sync_config;

impl Db {
    /// The current configuration, if one was ever saved.
    pub fn load_sync_config(&self) -> Result<Option<SyncConfig>> {
        let config = self
            .conn
            .query_row(
                r#"
                SELECT cookie, form_key, tchannel, revision, tag_id, subscription_day,
                       auto_fetch_interval, auto_fetch_enabled, updated_at
                FROM sync_config
                ORDER BY id DESC
                LIMIT 1
                "#,
                [],
                row_to_sync_config,
            )
            .optional()?;
        Ok(config)
    }

    /// Replaces the current configuration, creating it on first save.
    pub fn upsert_sync_config(&mut self, config: &SyncConfig) -> Result<()> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let credentials = &config.credentials;
        let tx = self.conn.transaction()?;
        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM sync_config ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            tx.execute(
                r#"
                UPDATE sync_config
                SET cookie = ?1, form_key = ?2, tchannel = ?3, revision = ?4, tag_id = ?5,
                    subscription_day = ?6, auto_fetch_interval = ?7, auto_fetch_enabled = ?8,
                    updated_at = ?9
                WHERE id = ?10
                "#,
                params![
                    credentials.cookie,
                    credentials.form_key,
                    credentials.channel,
                    credentials.revision,
                    credentials.tag_id,
                    config.cycle_start_day,
                    config.auto_sync_interval_minutes,
                    config.auto_sync_enabled,
                    now,
                    id,
                ],
            )?;
        } else {
            tx.execute(
                r#"
                INSERT INTO sync_config (
                  cookie, form_key, tchannel, revision, tag_id, subscription_day,
                  auto_fetch_interval, auto_fetch_enabled, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    credentials.cookie,
                    credentials.form_key,
                    credentials.channel,
                    credentials.revision,
                    credentials.tag_id,
                    config.cycle_start_day,
                    config.auto_sync_interval_minutes,
                    config.auto_sync_enabled,
                    now,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
