//! Clock and "h:mm AM/PM" label helpers for message timestamps.
//!
//! Timestamps are stored in UTC and shown in the viewer's offset.

#[cfg(test)]
#[path = "time_label_test.rs"]
mod time_label_test;

use chrono::{DateTime, FixedOffset, Local, Utc};

/// Current instant in UTC.
#[must_use]
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// The viewer's UTC offset in effect at `at`, so entries from either side
/// of a DST change keep their own wall-clock time.
#[must_use]
pub fn local_offset_at(at: DateTime<Utc>) -> FixedOffset {
    *at.with_timezone(&Local).offset()
}

/// Format `at` as en-US 12-hour time (`3:07 PM`) in `offset`.
#[must_use]
pub fn time_label(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%-I:%M %p").to_string()
}
