#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{DateTime, Local};
use points_core::{UsageEvent, recorded_at_from_micros};
use points_db::Db;
use tempfile::TempDir;

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub fn make_event(id: &str, at: DateTime<Local>, point_cost: i64, bot: &str) -> UsageEvent {
    let creation_time = at.timestamp_micros();
    UsageEvent {
        id: id.to_string(),
        point_cost,
        creation_time,
        bot_name: bot.to_string(),
        bot_id: format!("bot-{}", bot.to_ascii_lowercase()),
        cursor: format!("cursor-{id}"),
        recorded_at: recorded_at_from_micros(creation_time).expect("recorded at"),
    }
}

pub fn insert_events(db: &Db, events: &[UsageEvent]) {
    for event in events {
        db.insert_record(event).expect("insert record");
    }
}
