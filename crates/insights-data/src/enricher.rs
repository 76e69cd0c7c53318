//! Derives the hour-of-day and weekday buckets for every loaded message.

use chrono::{Datelike, Timelike};
use insights_core::models::{ChannelTable, EnrichedRow, MessageRow};

/// Attach `hour` and `weekday` to a single row.
///
/// Both are read from the timestamp in its own offset.  No timezone
/// conversion happens here.
pub fn enrich_row(message: MessageRow) -> EnrichedRow {
    let hour = message.timestamp.hour() as u8;
    let weekday = message.timestamp.weekday();
    EnrichedRow {
        message,
        hour,
        weekday,
    }
}

/// Enrich every row, keeping source order, and freeze the result.
pub fn enrich(rows: Vec<MessageRow>) -> ChannelTable {
    ChannelTable::from_rows(rows.into_iter().map(enrich_row).collect())
}
