//! Date display helpers

use chrono::{DateTime, Duration, Utc};

use crate::config::SiteConfig;

/// Human-facing date: a relative label for recent dates, otherwise the
/// date in the site timezone formatted with `time_format`.
///
/// Dates in the future are treated as one minute old.
pub fn format_show_date(date: &DateTime<Utc>, now: &DateTime<Utc>, config: &SiteConfig) -> String {
    let diff = now.signed_duration_since(*date);
    let diff = if diff > Duration::zero() {
        diff
    } else {
        Duration::minutes(1)
    };

    let day = Duration::days(1);
    let week = Duration::weeks(1);
    let month = Duration::days(30);
    let year = Duration::days(365);

    if diff < day {
        return "今天".to_string();
    }
    if diff < week {
        return format!("{} 天前", diff.num_days());
    }
    if diff < month {
        return format!("{} 周前", diff.num_weeks());
    }
    if diff < year {
        return format!("{} 月前", diff.num_days() / 30);
    }

    let years = diff.num_days() / 365;
    if years < 3 {
        return format!("{} 年前", years);
    }

    format_local_date(date, config)
}

/// Format a date in the site timezone
pub fn format_local_date(date: &DateTime<Utc>, config: &SiteConfig) -> String {
    match config.tz() {
        Ok(tz) => date.with_timezone(&tz).format(&config.time_format).to_string(),
        Err(_) => date.format(&config.time_format).to_string(),
    }
}
