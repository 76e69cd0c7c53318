//! Aggregate views over an enriched [`ChannelTable`].
//!
//! Every function here is pure: the table is only read, and calling the
//! same function twice on the same table yields identical results.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;
use insights_core::formatting::round_to;
use insights_core::models::{
    weekday_index, weekday_name, ActiveUser, ChannelTable, DayHourMatrix, HourlyHistogram,
    SummaryStatistics, WeekdayHistogram, HOURS_PER_DAY, WEEKDAYS,
};
use insights_core::{InsightsError, Result};
use tracing::{debug, info};

// ── ChannelAggregator ─────────────────────────────────────────────────────────

/// Stateless helper that builds histograms, the weekday/hour matrix, the
/// member ranking and summary statistics from a channel table.
pub struct ChannelAggregator;

impl ChannelAggregator {
    /// Message counts per hour of day, all 24 hours present.
    pub fn hourly_histogram(table: &ChannelTable) -> HourlyHistogram {
        let mut counts = [0u64; HOURS_PER_DAY];
        for row in table.rows() {
            counts[row.hour as usize] += 1;
        }
        HourlyHistogram { counts }
    }

    /// Message counts per weekday, Monday first, all seven days present.
    pub fn weekday_histogram(table: &ChannelTable) -> WeekdayHistogram {
        let mut counts = [0u64; 7];
        for row in table.rows() {
            counts[weekday_index(row.weekday)] += 1;
        }
        WeekdayHistogram { counts }
    }

    /// Weekday × hour message counts.
    ///
    /// With a non-empty `users` list only rows authored by one of those user
    /// ids are counted; rows without an author never match a filter.  Cells
    /// with no observations stay `None`.  Every weekday without a single
    /// observation is logged and listed in `missing_weekdays`.
    pub fn day_hour_matrix(table: &ChannelTable, users: &[String]) -> DayHourMatrix {
        let filter: HashSet<&str> = users.iter().map(String::as_str).collect();

        let mut observed = [[0u64; HOURS_PER_DAY]; 7];
        let mut counted = 0usize;
        for row in table.rows() {
            if !filter.is_empty() && !row.user_id().is_some_and(|id| filter.contains(id)) {
                continue;
            }
            observed[weekday_index(row.weekday)][row.hour as usize] += 1;
            counted += 1;
        }
        debug!(
            "Day/hour matrix: {} of {} rows counted ({} user filter(s))",
            counted,
            table.len(),
            filter.len()
        );

        let mut cells = [[None; HOURS_PER_DAY]; 7];
        for (day, hours) in observed.iter().enumerate() {
            for (hour, &count) in hours.iter().enumerate() {
                if count > 0 {
                    cells[day][hour] = Some(count);
                }
            }
        }

        let missing_weekdays: Vec<_> = WEEKDAYS
            .iter()
            .copied()
            .filter(|day| observed[weekday_index(*day)].iter().all(|&c| c == 0))
            .collect();
        for day in &missing_weekdays {
            info!("No messages on {}", weekday_name(*day));
        }

        DayHourMatrix {
            cells,
            missing_weekdays,
        }
    }

    /// Members ranked by message count, highest first.
    ///
    /// One line per distinct user id; the name is the first non-null name
    /// seen for that user.  Ties keep first-appearance order.  Rows without
    /// an author are ignored.  `top_n` truncates the ranking and must be
    /// positive.
    pub fn most_active(table: &ChannelTable, top_n: Option<usize>) -> Result<Vec<ActiveUser>> {
        if top_n == Some(0) {
            return Err(InsightsError::InvalidArgument(
                "number of most active members must be a positive integer".to_string(),
            ));
        }

        let mut ranking: Vec<ActiveUser> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for row in table.rows() {
            let Some(user_id) = row.user_id() else {
                continue;
            };
            let pos = *positions.entry(user_id).or_insert_with(|| {
                ranking.push(ActiveUser {
                    name: None,
                    user_id: user_id.to_string(),
                    messages: 0,
                });
                ranking.len() - 1
            });
            let entry = &mut ranking[pos];
            entry.messages += 1;
            if entry.name.is_none() {
                entry.name = row.message.name.clone();
            }
        }

        // Stable sort keeps first-appearance order among equal counts.
        ranking.sort_by(|a, b| b.messages.cmp(&a.messages));
        if let Some(n) = top_n {
            ranking.truncate(n);
        }
        Ok(ranking)
    }

    /// Scalar statistics over the whole table.
    ///
    /// Fails with [`InsightsError::EmptyInput`] when the table has no rows.
    pub fn summary_statistics(table: &ChannelTable) -> Result<SummaryStatistics> {
        let rows = table.rows();
        let dates: BTreeSet<NaiveDate> = rows.iter().map(|r| r.date()).collect();
        let (Some(channel), Some(&first_date), Some(&last_date)) =
            (table.chat_name(), dates.first(), dates.last())
        else {
            return Err(InsightsError::EmptyInput(
                "statistics need at least one message".to_string(),
            ));
        };

        let members: HashSet<&str> = rows.iter().filter_map(|r| r.user_id()).collect();
        let days_in_data = (last_date - first_date).num_days() + 1;
        let mean = rows.len() as f64 / dates.len() as f64;

        Ok(SummaryStatistics {
            channel: channel.to_string(),
            active_members: members.len(),
            messages: rows.len(),
            first_date,
            last_date,
            days_in_data,
            mean_messages_per_day: round_to(mean, 2),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enricher::enrich;
    use chrono::{DateTime, Weekday};
    use insights_core::models::{MessageId, MessageRow};
    use insights_core::ErrorKind;
    use std::collections::BTreeMap;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn make_row(id: i64, ts: &str, user: Option<&str>, name: Option<&str>) -> MessageRow {
        MessageRow {
            message_id: MessageId::Int(id),
            user_id: user.map(str::to_string),
            name: name.map(str::to_string),
            timestamp: DateTime::parse_from_rfc3339(ts).unwrap(),
            chat_name: "Rust Lounge".to_string(),
            extra: BTreeMap::new(),
        }
    }

    fn table(rows: Vec<MessageRow>) -> ChannelTable {
        enrich(rows)
    }

    /// Messages by `user` at the given timestamps, ids starting at `first_id`.
    fn burst(first_id: i64, user: &str, stamps: &[&str]) -> Vec<MessageRow> {
        stamps
            .iter()
            .enumerate()
            .map(|(i, ts)| make_row(first_id + i as i64, ts, Some(user), Some(user)))
            .collect()
    }

    // ── hourly_histogram ──────────────────────────────────────────────────────

    #[test]
    fn test_hourly_histogram_zero_filled() {
        let t = table(vec![
            make_row(1, "2024-01-15T09:00:00Z", Some("1"), None),
            make_row(2, "2024-01-15T09:59:59Z", Some("1"), None),
            make_row(3, "2024-01-16T22:10:00Z", Some("2"), None),
        ]);
        let hist = ChannelAggregator::hourly_histogram(&t);
        assert_eq!(hist.counts.len(), 24);
        assert_eq!(hist.counts[9], 2);
        assert_eq!(hist.counts[22], 1);
        assert_eq!(hist.counts[0], 0);
        assert_eq!(hist.total(), 3);
    }

    #[test]
    fn test_hourly_histogram_empty_table() {
        let hist = ChannelAggregator::hourly_histogram(&ChannelTable::default());
        assert_eq!(hist.total(), 0);
    }

    // ── weekday_histogram ─────────────────────────────────────────────────────

    #[test]
    fn test_weekday_histogram_monday_first() {
        // 2024-01-15 Mon, 2024-01-21 Sun.
        let t = table(vec![
            make_row(1, "2024-01-21T12:00:00Z", Some("1"), None),
            make_row(2, "2024-01-15T12:00:00Z", Some("1"), None),
            make_row(3, "2024-01-21T13:00:00Z", Some("2"), None),
        ]);
        let hist = ChannelAggregator::weekday_histogram(&t);
        assert_eq!(hist.counts, [1, 0, 0, 0, 0, 0, 2]);
        assert_eq!(hist.count(Weekday::Sun), 2);
    }

    #[test]
    fn test_histograms_sum_to_message_count() {
        let mut rows = burst(
            1,
            "1",
            &[
                "2024-02-01T00:00:00Z",
                "2024-02-02T05:00:00Z",
                "2024-02-03T11:00:00+03:00",
                "2024-02-04T23:00:00-08:00",
            ],
        );
        rows.push(make_row(10, "2024-02-05T18:00:00Z", None, None));
        let t = table(rows);
        assert_eq!(ChannelAggregator::hourly_histogram(&t).total(), t.len() as u64);
        assert_eq!(ChannelAggregator::weekday_histogram(&t).total(), t.len() as u64);
    }

    // ── day_hour_matrix ───────────────────────────────────────────────────────

    #[test]
    fn test_matrix_shape_on_empty_table() {
        let matrix = ChannelAggregator::day_hour_matrix(&ChannelTable::default(), &[]);
        assert_eq!(matrix.cells.len(), 7);
        assert!(matrix.cells.iter().all(|r| r.len() == 24));
        assert!(matrix.cells.iter().flatten().all(Option::is_none));
        assert_eq!(matrix.missing_weekdays, WEEKDAYS.to_vec());
    }

    #[test]
    fn test_matrix_missing_weekdays_monday_tuesday_only() {
        // 2024-01-15 Mon, 2024-01-16 Tue.
        let t = table(burst(
            1,
            "1",
            &[
                "2024-01-15T08:00:00Z",
                "2024-01-15T08:30:00Z",
                "2024-01-16T17:00:00Z",
            ],
        ));
        let matrix = ChannelAggregator::day_hour_matrix(&t, &[]);

        assert_eq!(matrix.get(Weekday::Mon, 8), Some(2));
        assert_eq!(matrix.get(Weekday::Tue, 17), Some(1));
        assert_eq!(matrix.get(Weekday::Mon, 9), None);
        assert_eq!(
            matrix.missing_weekdays,
            vec![
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun
            ]
        );
        for day in &matrix.missing_weekdays {
            assert!(matrix.row(*day).iter().all(Option::is_none));
        }
    }

    #[test]
    fn test_matrix_user_filter() {
        let mut rows = burst(1, "1", &["2024-01-15T08:00:00Z"]);
        rows.extend(burst(2, "2", &["2024-01-16T09:00:00Z", "2024-01-16T09:10:00Z"]));
        rows.push(make_row(9, "2024-01-17T10:00:00Z", None, None));
        let t = table(rows);

        let all = ChannelAggregator::day_hour_matrix(&t, &[]);
        assert_eq!(all.total(), 4);
        assert_eq!(all.get(Weekday::Wed, 10), Some(1));

        let only_two = ChannelAggregator::day_hour_matrix(&t, &["2".to_string()]);
        assert_eq!(only_two.total(), 2);
        assert_eq!(only_two.get(Weekday::Tue, 9), Some(2));
        assert_eq!(only_two.get(Weekday::Mon, 8), None);
        assert!(only_two.missing_weekdays.contains(&Weekday::Mon));
        assert!(only_two.missing_weekdays.contains(&Weekday::Wed));
    }

    #[test]
    fn test_matrix_unknown_user_is_all_missing() {
        let t = table(burst(1, "1", &["2024-01-15T08:00:00Z"]));
        let matrix = ChannelAggregator::day_hour_matrix(&t, &["404".to_string()]);
        assert_eq!(matrix.max_count(), None);
        assert_eq!(matrix.missing_weekdays.len(), 7);
    }

    // ── most_active ───────────────────────────────────────────────────────────

    #[test]
    fn test_most_active_rejects_zero() {
        let t = table(burst(1, "1", &["2024-01-15T08:00:00Z"]));
        let err = ChannelAggregator::most_active(&t, Some(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_most_active_top_two_of_five() {
        let mut rows = Vec::new();
        let mut id = 0;
        for (user, count) in [("a", 1), ("b", 4), ("c", 2), ("d", 5), ("e", 3)] {
            for _ in 0..count {
                id += 1;
                rows.push(make_row(id, "2024-01-15T08:00:00Z", Some(user), Some(user)));
            }
        }
        let t = table(rows);

        let top = ChannelAggregator::most_active(&t, Some(2)).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].user_id, "d");
        assert_eq!(top[0].messages, 5);
        assert_eq!(top[1].user_id, "b");
        assert_eq!(top[1].messages, 4);

        let all = ChannelAggregator::most_active(&t, None).unwrap();
        assert_eq!(all.len(), 5);
        assert!(all.windows(2).all(|w| w[0].messages >= w[1].messages));
    }

    #[test]
    fn test_most_active_ties_keep_first_appearance() {
        let t = table(vec![
            make_row(1, "2024-01-15T08:00:00Z", Some("late"), None),
            make_row(2, "2024-01-15T08:01:00Z", Some("early"), None),
            make_row(3, "2024-01-15T08:02:00Z", Some("early"), None),
            make_row(4, "2024-01-15T08:03:00Z", Some("late"), None),
        ]);
        let ranking = ChannelAggregator::most_active(&t, None).unwrap();
        assert_eq!(ranking[0].user_id, "late");
        assert_eq!(ranking[1].user_id, "early");
    }

    #[test]
    fn test_most_active_uses_first_known_name() {
        let t = table(vec![
            make_row(1, "2024-01-15T08:00:00Z", Some("7"), None),
            make_row(2, "2024-01-15T08:01:00Z", Some("7"), Some("Ferris")),
            make_row(3, "2024-01-15T08:02:00Z", Some("7"), Some("Ferris the Crab")),
        ]);
        let ranking = ChannelAggregator::most_active(&t, None).unwrap();
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].name.as_deref(), Some("Ferris"));
        assert_eq!(ranking[0].messages, 3);
    }

    #[test]
    fn test_most_active_n_larger_than_users() {
        let t = table(burst(1, "1", &["2024-01-15T08:00:00Z"]));
        assert_eq!(ChannelAggregator::most_active(&t, Some(10)).unwrap().len(), 1);
    }

    // ── summary_statistics ────────────────────────────────────────────────────

    #[test]
    fn test_summary_statistics_empty_table() {
        let err = ChannelAggregator::summary_statistics(&ChannelTable::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyInput);
    }

    #[test]
    fn test_summary_mean_uses_distinct_dates() {
        // 5 messages over 2 active dates in a 10-day span.
        let mut rows = burst(
            1,
            "1",
            &[
                "2024-03-01T08:00:00Z",
                "2024-03-01T09:00:00Z",
                "2024-03-01T10:00:00Z",
            ],
        );
        rows.extend(burst(10, "2", &["2024-03-10T08:00:00Z", "2024-03-10T09:00:00Z"]));
        let stats = ChannelAggregator::summary_statistics(&table(rows)).unwrap();

        assert_eq!(stats.channel, "Rust Lounge");
        assert_eq!(stats.messages, 5);
        assert_eq!(stats.first_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(stats.last_date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(stats.days_in_data, 10);
        assert_eq!(stats.mean_messages_per_day, 2.5);
    }

    #[test]
    fn test_summary_mean_rounded() {
        let mut rows = burst(1, "1", &["2024-03-01T08:00:00Z", "2024-03-01T09:00:00Z"]);
        rows.extend(burst(10, "1", &["2024-03-02T08:00:00Z"]));
        rows.extend(burst(20, "1", &["2024-03-03T08:00:00Z"]));
        let stats = ChannelAggregator::summary_statistics(&table(rows)).unwrap();
        assert_eq!(stats.mean_messages_per_day, 1.33);
    }

    #[test]
    fn test_summary_dates_ignore_source_order() {
        let rows = burst(1, "1", &["2024-03-05T08:00:00Z", "2024-03-02T08:00:00Z"]);
        let stats = ChannelAggregator::summary_statistics(&table(rows)).unwrap();
        assert_eq!(stats.first_date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(stats.days_in_data, 4);
    }

    // ── Scenarios ─────────────────────────────────────────────────────────────

    #[test]
    fn test_same_day_three_hours_two_users() {
        let t = table(vec![
            make_row(1, "2024-01-15T08:00:00Z", Some("1"), Some("Ferris")),
            make_row(2, "2024-01-15T12:00:00Z", Some("2"), Some("Corro")),
            make_row(3, "2024-01-15T20:00:00Z", Some("1"), Some("Ferris")),
        ]);
        let hist = ChannelAggregator::hourly_histogram(&t);
        assert_eq!(hist.counts.iter().filter(|c| **c > 0).count(), 3);
        assert_eq!(hist.total(), 3);

        let stats = ChannelAggregator::summary_statistics(&t).unwrap();
        assert_eq!(stats.messages, 3);
        assert_eq!(stats.days_in_data, 1);
        assert_eq!(stats.active_members, 2);
        assert_eq!(stats.mean_messages_per_day, 3.0);
    }

    #[test]
    fn test_null_author_counted_in_totals_only() {
        let t = table(vec![
            make_row(1, "2024-01-15T08:00:00Z", Some("1"), Some("Ferris")),
            make_row(2, "2024-01-15T09:00:00Z", None, Some("Channel")),
            make_row(3, "2024-01-16T10:00:00Z", Some("2"), Some("Corro")),
        ]);

        let ranking = ChannelAggregator::most_active(&t, None).unwrap();
        assert_eq!(ranking.len(), 2);
        assert!(ranking.iter().all(|u| u.user_id == "1" || u.user_id == "2"));

        let stats = ChannelAggregator::summary_statistics(&t).unwrap();
        assert_eq!(stats.active_members, 2);
        assert_eq!(stats.messages, 3);

        assert_eq!(ChannelAggregator::hourly_histogram(&t).counts[9], 1);
        assert_eq!(ChannelAggregator::weekday_histogram(&t).count(Weekday::Mon), 2);
    }

    #[test]
    fn test_views_are_idempotent() {
        let build = || {
            table(vec![
                make_row(1, "2024-01-15T08:00:00Z", Some("1"), Some("Ferris")),
                make_row(2, "2024-01-18T12:00:00+05:30", Some("2"), Some("Corro")),
                make_row(3, "2024-01-20T20:00:00Z", None, None),
            ])
        };
        let (a, b) = (build(), build());
        assert_eq!(
            ChannelAggregator::hourly_histogram(&a),
            ChannelAggregator::hourly_histogram(&b)
        );
        assert_eq!(
            ChannelAggregator::weekday_histogram(&a),
            ChannelAggregator::weekday_histogram(&b)
        );
        assert_eq!(
            ChannelAggregator::day_hour_matrix(&a, &[]),
            ChannelAggregator::day_hour_matrix(&b, &[])
        );
        assert_eq!(
            ChannelAggregator::most_active(&a, None).unwrap(),
            ChannelAggregator::most_active(&b, None).unwrap()
        );
        assert_eq!(
            ChannelAggregator::summary_statistics(&a).unwrap(),
            ChannelAggregator::summary_statistics(&b).unwrap()
        );
    }
}
