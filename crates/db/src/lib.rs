mod analytics;
mod error;
mod helpers;
mod migrations;
mod records;
mod sync_config;

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

pub use error::{DbError, Result};
pub use migrations::MIGRATIONS;

/// SQLite-backed store for usage records and the sync configuration.
///
/// Each `Db` owns one connection. Callers open a fresh handle per unit of
/// work; WAL mode lets readers proceed while a single writer commits.
pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        conn.pragma_update(None, "cache_size", -20_000)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(Self { conn })
    }
}
