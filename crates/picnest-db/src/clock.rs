use std::sync::Mutex;

use chrono::{DateTime, Datelike, Duration, SecondsFormat, SubsecRound, TimeZone, Utc};
use rusqlite::types::Type;

/// How long a story stays visible after creation.
pub const STORY_TTL_HOURS: i64 = 24;

/// Source of "now" for defaulted timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Expiry of a story created at `created_at`, or `None` when that falls
/// past the end of the representable range.
pub fn story_expiry(created_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    created_at.checked_add_signed(Duration::hours(STORY_TTL_HOURS))
}

/// Stored precision is microseconds; anything finer is dropped up front so
/// returned rows compare equal to what a later read produces.
pub(crate) fn normalize(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

/// Fixed-width text form, so SQL string comparison orders chronologically.
pub(crate) fn encode(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Encoded comparison bound for a caller's `now`. Stored values all fall in
/// years 0000-9999, so clamping to that range keeps every comparison intact.
pub(crate) fn encode_bound(ts: DateTime<Utc>) -> String {
    let ts = match ts.year() {
        y if y < 0 => Utc.with_ymd_and_hms(0, 1, 1, 0, 0, 0).single(),
        y if y > 9999 => Utc
            .with_ymd_and_hms(9999, 12, 31, 23, 59, 59)
            .single()
            .map(|t| t + Duration::microseconds(999_999)),
        _ => Some(ts),
    };
    ts.map(|t| encode(normalize(t))).unwrap_or_default()
}

pub(crate) fn decode(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
