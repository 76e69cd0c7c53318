use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, Weekday};
use serde::{Deserialize, Serialize, Serializer};

// ── Weekdays ──────────────────────────────────────────────────────────────────

/// The seven weekdays in Monday-first order.  Every weekday-indexed view in
/// this crate uses this ordering.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Number of hour buckets in a day.
pub const HOURS_PER_DAY: usize = 24;

/// Full English name of `day`, e.g. `"Monday"`.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Position of `day` in [`WEEKDAYS`] (Monday = 0).
pub fn weekday_index(day: Weekday) -> usize {
    day.num_days_from_monday() as usize
}

fn serialize_weekday_names<S: Serializer>(days: &[Weekday], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(days.iter().map(|d| weekday_name(*d)))
}

// ── MessageId ─────────────────────────────────────────────────────────────────

/// Message identifier exactly as the export supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    Int(i64),
    Text(String),
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Int(id) => write!(f, "{}", id),
            MessageId::Text(id) => f.write_str(id),
        }
    }
}

// ── MessageRow / EnrichedRow ──────────────────────────────────────────────────

/// A single message record read from a channel export.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRow {
    /// Unique identifier within one loaded table.
    pub message_id: MessageId,
    /// Canonical author id; `None` for service messages without an author.
    pub user_id: Option<String>,
    /// Author display name; may change between messages of the same user.
    pub name: Option<String>,
    /// Send time, kept in whatever offset the export encoded.
    pub timestamp: DateTime<FixedOffset>,
    /// Channel label, constant across a load.
    pub chat_name: String,
    /// Non-required export columns, keyed by their source column name.
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A [`MessageRow`] plus the time buckets derived from its timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRow {
    pub message: MessageRow,
    /// Hour of day, 0–23, in the timestamp's own offset.
    pub hour: u8,
    pub weekday: Weekday,
}

impl EnrichedRow {
    /// Calendar date of the message (date only).
    pub fn date(&self) -> NaiveDate {
        self.message.timestamp.date_naive()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.message.user_id.as_deref()
    }
}

// ── ChannelTable ──────────────────────────────────────────────────────────────

/// All enriched rows of one load, in source order.  Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelTable {
    rows: Vec<EnrichedRow>,
}

impl ChannelTable {
    pub fn from_rows(rows: Vec<EnrichedRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[EnrichedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Channel label taken from the first row, `None` for an empty table.
    pub fn chat_name(&self) -> Option<&str> {
        self.rows.first().map(|r| r.message.chat_name.as_str())
    }
}

// ── Aggregate views ───────────────────────────────────────────────────────────

/// Message counts per hour of day; every hour present, zero-filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyHistogram {
    pub counts: [u64; HOURS_PER_DAY],
}

impl HourlyHistogram {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// `(hour, count)` pairs in hour order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts.iter().enumerate().map(|(h, c)| (h as u8, *c))
    }
}

/// Message counts per weekday, Monday first; every weekday present,
/// zero-filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayHistogram {
    pub counts: [u64; 7],
}

impl WeekdayHistogram {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn count(&self, day: Weekday) -> u64 {
        self.counts[weekday_index(day)]
    }

    /// `(weekday, count)` pairs, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, u64)> + '_ {
        WEEKDAYS.iter().copied().zip(self.counts.iter().copied())
    }
}

/// Complete 7×24 weekday-by-hour grid.
///
/// A cell is `None` when no message was observed for that weekday and hour;
/// "no data" is deliberately kept distinct from a zero count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayHourMatrix {
    /// Rows in [`WEEKDAYS`] order, columns are hours 0–23.
    pub cells: [[Option<u64>; HOURS_PER_DAY]; 7],
    /// Weekdays with no observations at all, Monday first.
    #[serde(serialize_with = "serialize_weekday_names")]
    pub missing_weekdays: Vec<Weekday>,
}

impl DayHourMatrix {
    pub fn get(&self, day: Weekday, hour: u8) -> Option<u64> {
        self.cells[weekday_index(day)][hour as usize]
    }

    pub fn row(&self, day: Weekday) -> &[Option<u64>; HOURS_PER_DAY] {
        &self.cells[weekday_index(day)]
    }

    /// Largest observed cell count, `None` when every cell is missing.
    pub fn max_count(&self) -> Option<u64> {
        self.cells.iter().flatten().flatten().copied().max()
    }

    /// Sum of all observed cells.
    pub fn total(&self) -> u64 {
        self.cells.iter().flatten().flatten().sum()
    }
}

/// One line of the most-active-members ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveUser {
    pub name: Option<String>,
    pub user_id: String,
    pub messages: u64,
}

/// Scalar summary of a whole channel table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub channel: String,
    pub active_members: usize,
    pub messages: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    /// Inclusive span `last_date - first_date + 1`.
    pub days_in_data: i64,
    /// Messages divided by the number of distinct dates that have messages,
    /// rounded to two decimals.
    pub mean_messages_per_day: f64,
}
