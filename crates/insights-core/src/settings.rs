use clap::Parser;
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Analyse an exported chat channel log and create insights
#[derive(Parser, Debug, Clone)]
#[command(
    name = "channel-insights",
    about = "Analyse an exported chat channel log and create insights",
    version
)]
pub struct Settings {
    /// JSON file containing the exported channel
    pub file: PathBuf,

    /// Create chart of posting times
    #[arg(short = 't', long = "time")]
    pub time: bool,

    /// Create heatmap of posting days vs. times for all users or certain user IDs
    #[arg(long = "days-hours", visible_alias = "dh", num_args = 0.., value_name = "USER_ID")]
    pub days_hours: Option<Vec<String>>,

    /// Create chart of messages per weekday
    #[arg(short = 'w', long = "weekday")]
    pub weekday: bool,

    /// Show statistics (#members, #messages, mean #messages per day etc.)
    #[arg(short = 's', long = "statistics")]
    pub statistics: bool,

    /// Show the top N members by messages and their message count (N > 0)
    #[arg(long = "most-active", visible_alias = "ma", value_name = "N", value_parser = parse_positive)]
    pub most_active: Option<usize>,

    /// Directory chart images are written to
    #[arg(short = 'o', long, env = "CHANNEL_INSIGHTS_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Output format for statistics and rankings
    #[arg(long, default_value = "table", value_parser = ["table", "json"])]
    pub format: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── ViewRequest ────────────────────────────────────────────────────────────────

/// One output the user asked for on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewRequest {
    HourlyChart,
    /// Heatmap restricted to `users`; empty means every user.
    DayHourHeatmap { users: Vec<String> },
    WeekdayChart,
    Statistics,
    MostActive { n: usize },
}

impl ViewRequest {
    /// `true` for views that write an image instead of printing text.
    pub fn is_chart(&self) -> bool {
        matches!(
            self,
            ViewRequest::HourlyChart | ViewRequest::DayHourHeatmap { .. } | ViewRequest::WeekdayChart
        )
    }
}

impl Settings {
    /// Views requested by the flags, in the order they are produced.
    pub fn requested_views(&self) -> Vec<ViewRequest> {
        let mut views = Vec::new();
        if self.time {
            views.push(ViewRequest::HourlyChart);
        }
        if let Some(users) = &self.days_hours {
            views.push(ViewRequest::DayHourHeatmap {
                users: users.clone(),
            });
        }
        if self.weekday {
            views.push(ViewRequest::WeekdayChart);
        }
        if self.statistics {
            views.push(ViewRequest::Statistics);
        }
        if let Some(n) = self.most_active {
            views.push(ViewRequest::MostActive { n });
        }
        views
    }

    /// Log level after applying `--debug`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }

    pub fn json_output(&self) -> bool {
        self.format == "json"
    }
}

/// Parse a strictly positive integer argument.
pub fn parse_positive(input: &str) -> Result<usize, String> {
    const MSG: &str = "invalid value: must be a positive int";
    let value: usize = input.trim().parse().map_err(|_| MSG.to_string())?;
    if value == 0 {
        return Err(MSG.to_string());
    }
    Ok(value)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["channel-insights", "export.json"]);

        assert_eq!(settings.file, PathBuf::from("export.json"));
        assert!(!settings.time);
        assert!(settings.days_hours.is_none());
        assert!(!settings.weekday);
        assert!(!settings.statistics);
        assert!(settings.most_active.is_none());
        assert_eq!(settings.format, "table");
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
        assert!(settings.requested_views().is_empty());
    }

    #[test]
    fn test_settings_requires_file() {
        assert!(Settings::try_parse_from(["channel-insights"]).is_err());
    }

    #[test]
    fn test_settings_short_flags() {
        let settings = Settings::parse_from(["channel-insights", "export.json", "-t", "-w", "-s"]);
        assert_eq!(
            settings.requested_views(),
            vec![
                ViewRequest::HourlyChart,
                ViewRequest::WeekdayChart,
                ViewRequest::Statistics
            ]
        );
    }

    // ── --days-hours ──────────────────────────────────────────────────────────

    #[test]
    fn test_days_hours_without_ids_means_all_users() {
        let settings = Settings::parse_from(["channel-insights", "export.json", "--days-hours"]);
        assert_eq!(settings.days_hours, Some(vec![]));
        assert_eq!(
            settings.requested_views(),
            vec![ViewRequest::DayHourHeatmap { users: vec![] }]
        );
    }

    #[test]
    fn test_days_hours_with_ids_and_alias() {
        let settings =
            Settings::parse_from(["channel-insights", "export.json", "--dh", "101", "202"]);
        assert_eq!(
            settings.days_hours,
            Some(vec!["101".to_string(), "202".to_string()])
        );
    }

    // ── --most-active ─────────────────────────────────────────────────────────

    #[test]
    fn test_most_active_positive() {
        let settings = Settings::parse_from(["channel-insights", "export.json", "--ma", "5"]);
        assert_eq!(settings.most_active, Some(5));
        assert_eq!(
            settings.requested_views(),
            vec![ViewRequest::MostActive { n: 5 }]
        );
    }

    #[test]
    fn test_most_active_rejects_zero_and_garbage() {
        assert!(
            Settings::try_parse_from(["channel-insights", "export.json", "--most-active", "0"])
                .is_err()
        );
        assert!(
            Settings::try_parse_from(["channel-insights", "export.json", "--most-active", "-3"])
                .is_err()
        );
        assert!(
            Settings::try_parse_from(["channel-insights", "export.json", "--most-active", "ten"])
                .is_err()
        );
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive("3"), Ok(3));
        assert_eq!(parse_positive(" 12 "), Ok(12));
        assert!(parse_positive("0").is_err());
        assert!(parse_positive("1.5").is_err());
    }

    // ── ordering / misc ───────────────────────────────────────────────────────

    #[test]
    fn test_requested_views_follow_fixed_order() {
        let settings = Settings::parse_from([
            "channel-insights",
            "export.json",
            "--most-active",
            "3",
            "-s",
            "-w",
            "--days-hours",
            "7",
            "-t",
        ]);
        assert_eq!(
            settings.requested_views(),
            vec![
                ViewRequest::HourlyChart,
                ViewRequest::DayHourHeatmap {
                    users: vec!["7".to_string()]
                },
                ViewRequest::WeekdayChart,
                ViewRequest::Statistics,
                ViewRequest::MostActive { n: 3 },
            ]
        );
    }

    #[test]
    fn test_chart_views() {
        assert!(ViewRequest::HourlyChart.is_chart());
        assert!(ViewRequest::DayHourHeatmap { users: vec![] }.is_chart());
        assert!(!ViewRequest::Statistics.is_chart());
        assert!(!ViewRequest::MostActive { n: 1 }.is_chart());
    }

    #[test]
    fn test_debug_overrides_log_level() {
        let settings = Settings::parse_from([
            "channel-insights",
            "export.json",
            "--log-level",
            "ERROR",
            "--debug",
        ]);
        assert_eq!(settings.effective_log_level(), "DEBUG");
    }

    #[test]
    fn test_json_format() {
        let settings = Settings::parse_from(["channel-insights", "export.json", "--format", "json"]);
        assert!(settings.json_output());
        assert!(
            Settings::try_parse_from(["channel-insights", "export.json", "--format", "xml"])
                .is_err()
        );
    }

    #[test]
    fn test_output_dir_flag() {
        let settings = Settings::parse_from(["channel-insights", "export.json", "-o", "/tmp/charts"]);
        assert_eq!(settings.output_dir, PathBuf::from("/tmp/charts"));
    }
}
