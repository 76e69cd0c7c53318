use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use serde_json::Value;
use tracing::debug;

// ── TimestampParser ───────────────────────────────────────────────────────────

/// Parses export timestamps into offset-aware date-times.
///
/// The offset the export wrote is preserved, so hour and weekday buckets are
/// computed in the channel's own wall-clock time.  Strings without any
/// offset are taken as UTC wall-clock time.
pub struct TimestampParser;

/// Offset-carrying patterns, tried after normalising a trailing `Z`.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

/// Patterns without an offset.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
];

impl TimestampParser {
    /// Parse a JSON cell.
    ///
    /// * JSON string → see [`TimestampParser::parse_str`].
    /// * JSON number → Unix seconds (integer or float), UTC.
    /// * anything else → `None`.
    pub fn parse(value: &Value) -> Option<DateTime<FixedOffset>> {
        match value {
            Value::String(s) => Self::parse_str(s),
            Value::Number(n) => {
                let utc = if let Some(secs) = n.as_i64() {
                    DateTime::<Utc>::from_timestamp(secs, 0)
                } else {
                    let f = n.as_f64()?;
                    // Floor keeps the sub-second part non-negative before 1970.
                    let whole = f.floor();
                    let nanos = ((f - whole) * 1_000_000_000.0).round() as u32;
                    let (secs, nanos) = if nanos >= 1_000_000_000 {
                        (whole as i64 + 1, 0)
                    } else {
                        (whole as i64, nanos)
                    };
                    DateTime::<Utc>::from_timestamp(secs, nanos)
                };
                utc.map(|dt| dt.fixed_offset())
            }
            _ => None,
        }
    }

    /// Parse an ISO-8601-like string, with `T` or space separator, optional
    /// fractional seconds, and an optional `Z` / `±HH:MM` / `±HHMM` offset.
    /// Date-only strings map to midnight.
    pub fn parse_str(s: &str) -> Option<DateTime<FixedOffset>> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let normalised = match s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
            Some(stripped) => format!("{}+00:00", stripped),
            None => s.to_string(),
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt);
        }

        for fmt in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(&normalised, fmt) {
                return Some(dt);
            }
        }

        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(utc_offset().from_utc_datetime(&naive));
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Some(utc_offset().from_utc_datetime(&naive));
        }

        debug!("TimestampParser: could not parse timestamp string \"{}\"", s);
        None
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}
