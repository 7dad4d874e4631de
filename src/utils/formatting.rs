//! Display helpers for presentation layers

use chrono::NaiveDate;

/// Shown when an episode date cannot be parsed
pub const INVALID_DATE: &str = "Invalid date";

/// Render a raw `DD/MM/YYYY` sheet date as e.g. `February 1, 2023`
pub fn format_episode_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y") {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => INVALID_DATE.to_string(),
    }
}
