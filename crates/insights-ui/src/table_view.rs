//! Plain-text tables for the statistics and most-active views.
//!
//! Tables are laid out by a bordered [`ratatui::widgets::Table`] rendered
//! into an off-screen [`Buffer`], which is then flushed as plain lines so
//! the output can be printed to stdout or piped into a file.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    text::Line,
    widgets::{Block, Borders, Cell, Row, Table, Widget},
};
use unicode_width::UnicodeWidthStr;

use insights_core::formatting;
use insights_core::models::{ActiveUser, SummaryStatistics};

/// Columns between two adjacent table columns.
const COLUMN_SPACING: u16 = 1;

/// Widest a single column may grow.
const MAX_COLUMN_WIDTH: u16 = 120;

/// Body rows per bordered block.
const ROWS_PER_BLOCK: usize = 10_000;

/// Placeholder printed for a member without a display name.
const NO_NAME: &str = "-";

// ── Public API ────────────────────────────────────────────────────────────────

/// `(parameter, value)` pairs of the statistics table, in display order.
pub fn statistics_rows(stats: &SummaryStatistics) -> Vec<(&'static str, String)> {
    vec![
        ("Channel", stats.channel.clone()),
        ("Active Members", formatting::format_count(stats.active_members as u64)),
        ("Messages", formatting::format_count(stats.messages as u64)),
        ("First date", stats.first_date.format("%Y-%m-%d").to_string()),
        ("Last date", stats.last_date.format("%Y-%m-%d").to_string()),
        ("Days in data", stats.days_in_data.to_string()),
        (
            "Mean # messages per day",
            formatting::format_mean(stats.mean_messages_per_day),
        ),
    ]
}

/// Render summary statistics as a two-column Parameter/Value table.
pub fn render_statistics_table(stats: &SummaryStatistics) -> Vec<String> {
    let rows: Vec<Vec<String>> = statistics_rows(stats)
        .into_iter()
        .map(|(param, value)| vec![param.to_string(), value])
        .collect();
    render_lines(
        "Statistics",
        &["Parameter", "Value"],
        &rows,
        &[false, true],
    )
}

/// Render the most-active ranking as a Name/UserID/Messages table.
pub fn render_ranking_table(ranking: &[ActiveUser]) -> Vec<String> {
    let rows: Vec<Vec<String>> = ranking
        .iter()
        .map(|user| {
            vec![
                user.name.clone().unwrap_or_else(|| NO_NAME.to_string()),
                user.user_id.clone(),
                formatting::format_count(user.messages),
            ]
        })
        .collect();
    render_lines(
        "Most Active Members",
        &["Name", "UserID", "Messages"],
        &rows,
        &[false, false, true],
    )
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Lay out `rows` under `headers` and return the drawn lines, right-trimmed.
///
/// Long tables are split into consecutive bordered blocks of at most
/// [`ROWS_PER_BLOCK`] rows, each repeating the header.
fn render_lines(
    title: &str,
    headers: &[&str],
    rows: &[Vec<String>],
    right_align: &[bool],
) -> Vec<String> {
    let widths = column_widths(headers, rows);
    let first_title = format!(" {} ", title);
    let next_title = format!(" {} (continued) ", title);

    let inner_width = widths
        .iter()
        .fold(0u16, |acc, w| acc.saturating_add(*w))
        .saturating_add(COLUMN_SPACING.saturating_mul(
            u16::try_from(widths.len().saturating_sub(1)).unwrap_or(u16::MAX),
        ));
    let title_width = u16::try_from(next_title.width()).unwrap_or(u16::MAX);
    let width = inner_width.max(title_width).saturating_add(2);

    if rows.is_empty() {
        return render_block(first_title, headers, &[], right_align, &widths, width);
    }
    rows.chunks(ROWS_PER_BLOCK)
        .enumerate()
        .flat_map(|(i, chunk)| {
            let block_title = if i == 0 {
                first_title.clone()
            } else {
                next_title.clone()
            };
            render_block(block_title, headers, chunk, right_align, &widths, width)
        })
        .collect()
}

/// Draw one bordered table of `rows` into a buffer `width` cells wide.
fn render_block(
    title: String,
    headers: &[&str],
    rows: &[Vec<String>],
    right_align: &[bool],
    widths: &[u16],
    width: u16,
) -> Vec<String> {
    let height = u16::try_from(rows.len().saturating_add(3)).unwrap_or(u16::MAX);
    let area = Rect::new(0, 0, width, height);

    let align = |text: String, col: usize| -> Cell<'static> {
        let line = Line::from(text);
        if right_align.get(col).copied().unwrap_or(false) {
            Cell::from(line.right_aligned())
        } else {
            Cell::from(line)
        }
    };

    let header = Row::new(
        headers
            .iter()
            .enumerate()
            .map(|(i, h)| align(h.to_string(), i))
            .collect::<Vec<_>>(),
    );
    let body: Vec<Row> = rows
        .iter()
        .map(|r| {
            Row::new(
                r.iter()
                    .enumerate()
                    .map(|(i, v)| align(v.clone(), i))
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    let table = Table::new(body, widths.iter().map(|w| Constraint::Length(*w)))
        .header(header)
        .column_spacing(COLUMN_SPACING)
        .block(Block::default().borders(Borders::ALL).title(title));

    let mut buffer = Buffer::empty(area);
    table.render(area, &mut buffer);
    buffer_lines(&buffer)
}

/// Display width of every column: the widest of its header and values,
/// capped at [`MAX_COLUMN_WIDTH`].  Longer values are cut off.
fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<u16> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let widest = rows
                .iter()
                .filter_map(|r| r.get(i))
                .map(|v| v.width())
                .chain(std::iter::once(h.width()))
                .max()
                .unwrap_or(0);
            u16::try_from(widest)
                .unwrap_or(u16::MAX)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Flatten a buffer into text lines.  Cells hidden behind a wide glyph are
/// skipped so that each line has the same display width as the buffer.
fn buffer_lines(buffer: &Buffer) -> Vec<String> {
    let area = buffer.area;
    (area.top()..area.bottom())
        .map(|y| {
            let mut line = String::new();
            let mut skip = 0usize;
            for x in area.left()..area.right() {
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                let symbol = buffer[(x, y)].symbol();
                line.push_str(symbol);
                skip = symbol.width().saturating_sub(1);
            }
            line.trim_end().to_string()
        })
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
