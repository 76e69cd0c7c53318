//! Channel export loading.
//!
//! Reads the `{"columns": [...], "data": [[...], ...]}` document produced by
//! a chat export and converts every data row into a typed [`MessageRow`].
//! The load is all-or-nothing: the first malformed row aborts it.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use insights_core::models::{MessageId, MessageRow};
use insights_core::time_utils::TimestampParser;
use insights_core::{InsightsError, Result};
use serde_json::Value;
use tracing::{debug, warn};

// ── Column names ──────────────────────────────────────────────────────────────

/// Nested author object (`{"user_id": ...}`) or `null`.
pub const COL_AUTHOR: &str = "ID";
pub const COL_TIMESTAMP: &str = "Timestamp";
pub const COL_MESSAGE_ID: &str = "message ID";
pub const COL_CHAT_NAME: &str = "Chat name";
pub const COL_NAME: &str = "Name";

/// Sub-identifier inside the author object.
const AUTHOR_ID_FIELD: &str = "user_id";

const REQUIRED_COLUMNS: [&str; 5] = [
    COL_AUTHOR,
    COL_TIMESTAMP,
    COL_MESSAGE_ID,
    COL_CHAT_NAME,
    COL_NAME,
];

// ── Public types ──────────────────────────────────────────────────────────────

/// The raw export document: a column schema plus positionally aligned rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDocument {
    pub columns: Vec<String>,
    pub data: Vec<Vec<Value>>,
}

/// Counters collected while converting a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Data rows present in the document.
    pub rows_read: usize,
    /// Rows dropped because their message ID was already seen.
    pub duplicates_skipped: usize,
    /// Loaded rows without an author.
    pub null_authors: usize,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read and convert the export at `path`.
pub fn load_messages(path: &Path) -> Result<(Vec<MessageRow>, ReadStats)> {
    let content = std::fs::read_to_string(path).map_err(|source| InsightsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let document = parse_channel_document(&content)?;
    let (rows, stats) = build_rows(document)?;

    debug!(
        "File {}: {} read, {} duplicates skipped, {} without author",
        path.display(),
        stats.rows_read,
        stats.duplicates_skipped,
        stats.null_authors,
    );

    Ok((rows, stats))
}

/// Parse the JSON text of an export into a [`ChannelDocument`].
pub fn parse_channel_document(json: &str) -> Result<ChannelDocument> {
    let root: Value = serde_json::from_str(json)?;
    let obj = root
        .as_object()
        .ok_or_else(|| malformed("document root must be a JSON object"))?;

    let columns = obj
        .get("columns")
        .ok_or_else(|| malformed("document has no `columns` key"))?
        .as_array()
        .ok_or_else(|| malformed("`columns` must be an array"))?
        .iter()
        .enumerate()
        .map(|(i, c)| {
            c.as_str()
                .map(str::to_string)
                .ok_or_else(|| malformed(format!("column {} is not a string", i)))
        })
        .collect::<Result<Vec<String>>>()?;

    let data = obj
        .get("data")
        .ok_or_else(|| malformed("document has no `data` key"))?
        .as_array()
        .ok_or_else(|| malformed("`data` must be an array"))?
        .iter()
        .enumerate()
        .map(|(i, row)| {
            row.as_array()
                .cloned()
                .ok_or_else(|| malformed(format!("data row {} is not an array", i)))
        })
        .collect::<Result<Vec<Vec<Value>>>>()?;

    Ok(ChannelDocument { columns, data })
}

/// Convert every data row of `document` into a [`MessageRow`].
///
/// Fails on a missing required column, a row whose width differs from the
/// column count, an unusable author object or message ID, or an
/// unparseable timestamp.  Rows repeating an earlier message ID are skipped
/// so that IDs stay unique within the result.
pub fn build_rows(document: ChannelDocument) -> Result<(Vec<MessageRow>, ReadStats)> {
    let ChannelDocument { columns, data } = document;
    let layout = ColumnLayout::resolve(&columns)?;

    let mut stats = ReadStats {
        rows_read: data.len(),
        ..ReadStats::default()
    };
    let mut rows: Vec<MessageRow> = Vec::with_capacity(data.len());
    let mut seen_ids: HashSet<MessageId> = HashSet::with_capacity(data.len());

    for (index, values) in data.into_iter().enumerate() {
        if values.len() != columns.len() {
            return Err(malformed(format!(
                "row {} has {} values but {} columns were declared",
                index,
                values.len(),
                columns.len()
            )));
        }

        let row = layout.map_row(index, &columns, values)?;

        if !seen_ids.insert(row.message_id.clone()) {
            warn!(
                "Skipping row {}: duplicate message ID {}",
                index, row.message_id
            );
            stats.duplicates_skipped += 1;
            continue;
        }

        if row.user_id.is_none() {
            stats.null_authors += 1;
        }
        rows.push(row);
    }

    Ok((rows, stats))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Positions of the required columns within a row.
struct ColumnLayout {
    author: usize,
    timestamp: usize,
    message_id: usize,
    chat_name: usize,
    name: usize,
}

impl ColumnLayout {
    fn resolve(columns: &[String]) -> Result<Self> {
        let mut positions: HashMap<&str, usize> = HashMap::with_capacity(columns.len());
        for (i, col) in columns.iter().enumerate() {
            positions.entry(col.as_str()).or_insert(i);
        }

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| !positions.contains_key(c))
            .collect();
        if !missing.is_empty() {
            return Err(malformed(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            author: positions[COL_AUTHOR],
            timestamp: positions[COL_TIMESTAMP],
            message_id: positions[COL_MESSAGE_ID],
            chat_name: positions[COL_CHAT_NAME],
            name: positions[COL_NAME],
        })
    }

    fn is_required(&self, position: usize) -> bool {
        position == self.author
            || position == self.timestamp
            || position == self.message_id
            || position == self.chat_name
            || position == self.name
    }

    fn map_row(&self, index: usize, columns: &[String], values: Vec<Value>) -> Result<MessageRow> {
        let timestamp = TimestampParser::parse(&values[self.timestamp]).ok_or_else(|| {
            InsightsError::TimestampParse {
                row: index,
                value: display_value(&values[self.timestamp]),
            }
        })?;
        let message_id = extract_message_id(index, &values[self.message_id])?;
        let user_id = extract_user_id(index, &values[self.author])?;
        let name = text_or_none(&values[self.name]);
        let chat_name = text_or_none(&values[self.chat_name]).unwrap_or_default();

        let extra: BTreeMap<String, Value> = values
            .into_iter()
            .enumerate()
            .filter(|(pos, _)| !self.is_required(*pos))
            .map(|(pos, value)| (columns[pos].clone(), value))
            .collect();

        Ok(MessageRow {
            message_id,
            user_id,
            name,
            timestamp,
            chat_name,
            extra,
        })
    }
}

/// Message IDs are kept as given: integers stay integers, strings stay strings.
fn extract_message_id(index: usize, value: &Value) -> Result<MessageId> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(MessageId::Int)
            .ok_or_else(|| malformed(format!("row {}: message ID {} is not an integer", index, n))),
        Value::String(s) => Ok(MessageId::Text(s.clone())),
        other => Err(malformed(format!(
            "row {}: unusable message ID {}",
            index,
            display_value(other)
        ))),
    }
}

/// Canonical author id: `None` for a `null` author, otherwise the author
/// object's `user_id` rendered as a string.
fn extract_user_id(index: usize, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::Object(author) => match author.get(AUTHOR_ID_FIELD) {
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            _ => Err(malformed(format!(
                "row {}: author object has no `{}`",
                index, AUTHOR_ID_FIELD
            ))),
        },
        other => Err(malformed(format!(
            "row {}: author must be an object or null, got {}",
            index,
            display_value(other)
        ))),
    }
}

fn text_or_none(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn malformed(msg: impl Into<String>) -> InsightsError {
    InsightsError::MalformedInput(msg.into())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
