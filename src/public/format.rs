//! Display helpers for the public page.

use chrono::{DateTime, NaiveDate};

use crate::pagination::UNCATEGORIZED;

/// Human name for a skill category code; unknown codes display as-is
pub fn category_label(code: &str) -> &str {
    match code {
        "LANG" => "Programming Languages",
        "WEB" => "Web Technologies",
        "AI" => "AI/ML Technologies",
        "SOFT" => "Soft Skills",
        UNCATEGORIZED => "Other Skills",
        other => other,
    }
}

/// `2023-06-01` -> `Jun 2023`. Missing or blank dates mean the entry is
/// ongoing and render as "Present"; unparseable dates are shown raw.
pub fn format_month_year(date: Option<&str>) -> String {
    let Some(raw) = date.map(str::trim).filter(|s| !s.is_empty()) else {
        return "Present".to_string();
    };

    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format("%b %Y").to_string();
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.format("%b %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// "Jan 2020 - Present"
pub fn date_range(start: Option<&str>, end: Option<&str>) -> String {
    format!("{} - {}", format_month_year(start), format_month_year(end))
}
