use std::thread;

use chrono::{DateTime, Local};
use points_core::current_cycle_for;
use points_db::Db;
use tracing::{debug, info, warn};

use crate::feed::{FeedEvent, PointsFeed};
use crate::types::{Result, StopReason, SyncRequest, SyncStats};

enum EventOutcome {
    Inserted,
    Updated,
    Skipped,
    Duplicate,
}

fn store_event(db: &Db, event: &FeedEvent, full_sync: bool) -> EventOutcome {
    let Some(record) = event.to_usage_event() else {
        warn!(id = %event.id, creation_time = event.creation_time, "skipping event with unrepresentable timestamp");
        return EventOutcome::Skipped;
    };

    let exists = match db.record_exists(&record.id) {
        Ok(exists) => exists,
        Err(err) => {
            warn!(id = %record.id, error = %err, "existence check failed");
            return EventOutcome::Skipped;
        }
    };

    if !exists {
        match db.insert_record(&record) {
            Ok(true) => return EventOutcome::Inserted,
            // Another run stored the row after the existence check.
            Ok(false) => {}
            Err(err) => {
                warn!(id = %record.id, error = %err, "failed to insert record");
                return EventOutcome::Skipped;
            }
        }
    }

    if !full_sync {
        return EventOutcome::Duplicate;
    }

    match db.update_record(&record) {
        Ok(true) => EventOutcome::Updated,
        Ok(false) => EventOutcome::Skipped,
        Err(err) => {
            warn!(id = %record.id, error = %err, "failed to update record");
            EventOutcome::Skipped
        }
    }
}

/// Pulls history pages newest-first into `db` until the current billing cycle
/// is covered, a known record is hit (incremental runs), the feed runs dry, or
/// the page budget is spent.
///
/// Feed failures abort the run; records already written stay written.
/// Per-record store failures are logged and counted as skipped.
pub fn sync_points(
    db: &Db,
    feed: &dyn PointsFeed,
    request: &SyncRequest,
    now: DateTime<Local>,
) -> Result<SyncStats> {
    let cycle = current_cycle_for(request.cycle_start_day, now);
    let cutoff = cycle.start_micros();
    let mut stats = SyncStats::default();
    let mut cursor: Option<String> = None;

    info!(
        cycle = %cycle.label(),
        full_sync = request.full_sync,
        page_budget = ?request.page_budget,
        "sync started"
    );

    let stop_reason = loop {
        let page = feed.fetch_page(&request.credentials, cursor.as_deref())?;
        stats.pages_fetched += 1;
        debug!(
            page = stats.pages_fetched,
            events = page.events.len(),
            has_more = page.has_more,
            "fetched history page"
        );

        let mut stop = None;
        for event in &page.events {
            if event.creation_time <= cutoff {
                stop = Some(StopReason::ReachedCycleStart);
                break;
            }
            match store_event(db, event, request.full_sync) {
                EventOutcome::Inserted => stats.new_records += 1,
                EventOutcome::Updated => stats.updated_records += 1,
                EventOutcome::Skipped => stats.skipped_records += 1,
                EventOutcome::Duplicate => {
                    stop = Some(StopReason::DuplicateFound);
                    break;
                }
            }
        }
        if let Some(reason) = stop {
            break reason;
        }
        if !page.has_more {
            break StopReason::FeedExhausted;
        }
        if let Some(budget) = request.page_budget {
            if stats.pages_fetched >= budget as usize {
                break StopReason::PageBudgetExhausted;
            }
        }
        cursor = page.next_cursor;
        if !request.page_delay.is_zero() {
            thread::sleep(request.page_delay);
        }
    };

    stats.stop_reason = Some(stop_reason);
    info!(
        new = stats.new_records,
        updated = stats.updated_records,
        skipped = stats.skipped_records,
        pages = stats.pages_fetched,
        stop = ?stop_reason,
        "sync finished"
    );
    Ok(stats)
}
