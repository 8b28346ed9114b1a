use rusqlite::Connection;

use crate::Db;
use crate::error::Result;

const MIGRATION_0001: &str = include_str!("../migrations/0001_init.sql");
const MIGRATION_0002: &str = include_str!("../migrations/0002_add_sync_config.sql");
const MIGRATION_0003: &str = include_str!("../migrations/0003_add_bot_index.sql");

pub const MIGRATIONS: &[(&str, &str)] = &[
    ("0001_init", MIGRATION_0001),
    ("0002_add_sync_config", MIGRATION_0002),
    ("0003_add_bot_index", MIGRATION_0003),
];

impl Db {
    pub fn migrate(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        for (name, sql) in MIGRATIONS {
            if *name == "0001_init" && table_has_column(&tx, "points_history", "created_at")? {
                rename_legacy_created_at(&tx)?;
                continue;
            }
            tx.execute_batch(sql)?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Databases written by the first releases stored the ingest timestamp as
/// `created_at`; keep their rows and expose the column under its new name.
fn rename_legacy_created_at(conn: &Connection) -> Result<()> {
    conn.execute(
        "ALTER TABLE points_history RENAME COLUMN created_at TO recorded_at",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_points_history_creation_time ON points_history (creation_time)",
        [],
    )?;
    Ok(())
}
