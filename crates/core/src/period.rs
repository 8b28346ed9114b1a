use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone};

use crate::DEFAULT_CYCLE_START_DAY;

/// Half-open billing window `[start, end)` in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclePeriod {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl CyclePeriod {
    pub fn start_micros(&self) -> i64 {
        self.start.timestamp_micros()
    }

    pub fn end_micros(&self) -> i64 {
        self.end.timestamp_micros()
    }

    pub fn contains(&self, instant: &DateTime<Local>) -> bool {
        self.start <= *instant && *instant < self.end
    }

    /// `MM.DD - MM.DD` of the start and end dates.
    pub fn label(&self) -> String {
        format!("{} - {}", self.start.format("%m.%d"), self.end.format("%m.%d"))
    }
}

/// Days outside 1..=31 fall back to the first of the month.
pub fn normalize_cycle_day(day: u32) -> u32 {
    if (1..=31).contains(&day) {
        day
    } else {
        DEFAULT_CYCLE_START_DAY
    }
}

/// Moves `(year, month)` by `offset` months, carrying across years.
pub fn shift_month(year: i32, month: u32, offset: i32) -> (i32, u32) {
    let index = year * 12 + (month as i32 - 1) + offset;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = shift_month(year, month, 1);
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Cycle day for a concrete month; days past the month's end clamp to its last day.
fn anchor_day(year: i32, month: u32, cycle_start_day: u32) -> u32 {
    cycle_start_day.min(days_in_month(year, month))
}

fn cycle_anchor(year: i32, month: u32, cycle_start_day: u32) -> DateTime<Local> {
    let day = anchor_day(year, month, cycle_start_day);
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .or_else(|| NaiveDate::from_ymd_opt(year, month, 1))
        .unwrap_or_default();
    local_midnight(date)
}

fn local_midnight(date: NaiveDate) -> DateTime<Local> {
    let midnight = date.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        // Zones that skip midnight on DST change start the day at the first valid instant.
        .or_else(|| {
            Local
                .from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
        })
        .unwrap_or_else(|| Local.from_utc_datetime(&midnight))
}

/// Billing cycle that starts in `(year, month)` on `cycle_start_day`.
pub fn cycle_period(year: i32, month: u32, cycle_start_day: u32) -> CyclePeriod {
    let cycle_start_day = normalize_cycle_day(cycle_start_day);
    let month = month.clamp(1, 12);
    let (next_year, next_month) = shift_month(year, month, 1);
    CyclePeriod {
        start: cycle_anchor(year, month, cycle_start_day),
        end: cycle_anchor(next_year, next_month, cycle_start_day),
    }
}

/// Billing cycle containing `instant`.
pub fn current_cycle_for(cycle_start_day: u32, instant: DateTime<Local>) -> CyclePeriod {
    let cycle_start_day = normalize_cycle_day(cycle_start_day);
    let (mut year, mut month) = (instant.year(), instant.month());
    if instant.day() < anchor_day(year, month, cycle_start_day) {
        (year, month) = shift_month(year, month, -1);
    }
    cycle_period(year, month, cycle_start_day)
}

/// Cycle selected relative to `now`: offset 0 is the running cycle, -1 the one
/// starting a calendar month earlier, and so on.
pub fn cycle_with_offset(now: DateTime<Local>, cycle_start_day: u32, offset: i32) -> CyclePeriod {
    let cycle_start_day = normalize_cycle_day(cycle_start_day);
    let (mut year, mut month) = shift_month(now.year(), now.month(), offset);
    if offset == 0 && now.day() < anchor_day(year, month, cycle_start_day) {
        (year, month) = shift_month(year, month, -1);
    }
    cycle_period(year, month, cycle_start_day)
}
