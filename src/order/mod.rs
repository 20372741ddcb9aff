//! In-memory ordering of resource collections.
//!
//! Listings keep server order unless a consumer sorts explicitly; the admin
//! message list sorts newest-first by id and the public timeline sorts by start
//! date, newest first. Sorting is stable so ties keep server order.

pub mod error;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use std::cmp::Ordering;

use crate::record::{Record, ID_FIELD};
pub use error::OrderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub sort: SortDirection,
}

impl SortKey {
    pub fn asc(column: impl Into<String>) -> Self {
        Self { column: column.into(), sort: SortDirection::Asc }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self { column: column.into(), sort: SortDirection::Desc }
    }
}

/// Parse `"start_date desc, id asc"` into sort keys
pub fn parse_order(s: &str) -> Result<Vec<SortKey>, OrderError> {
    let mut out = Vec::new();
    for part in s.split(',') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        let mut it = trimmed.split_whitespace();
        let Some(col) = it.next() else { continue };
        if !col.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(OrderError::InvalidColumn(col.to_string()));
        }
        let dir = it.next().unwrap_or("asc");
        let sort = if dir.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else if dir.eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            return Err(OrderError::InvalidDirection {
                column: col.to_string(),
                direction: dir.to_string(),
            });
        };
        out.push(SortKey { column: col.to_string(), sort });
    }
    Ok(out)
}

/// Stable sort by the given keys. Missing or null values sort last in either direction.
pub fn sort_records(records: &mut [Record], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    records.sort_by(|a, b| compare_records(a, b, keys));
}

pub fn compare_records(a: &Record, b: &Record, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let av = field_value(a, &key.column);
        let bv = field_value(b, &key.column);
        let ord = match (sortable(av.as_ref()), sortable(bv.as_ref())) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => {
                let ord = x.cmp_to(&y);
                match key.sort {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            }
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn field_value(record: &Record, column: &str) -> Option<Value> {
    if column == ID_FIELD {
        return record.id().map(|id| id.to_value());
    }
    record.get(column).cloned()
}

enum Sortable {
    Number(f64),
    Date(i64),
    Text(String),
    Bool(bool),
}

impl Sortable {
    fn rank(&self) -> u8 {
        match self {
            Sortable::Bool(_) => 0,
            Sortable::Number(_) => 1,
            Sortable::Date(_) => 2,
            Sortable::Text(_) => 3,
        }
    }

    fn cmp_to(&self, other: &Sortable) -> Ordering {
        match (self, other) {
            (Sortable::Number(x), Sortable::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
            (Sortable::Date(x), Sortable::Date(y)) => x.cmp(y),
            (Sortable::Text(x), Sortable::Text(y)) => x.cmp(y),
            (Sortable::Bool(x), Sortable::Bool(y)) => x.cmp(y),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

fn sortable(value: Option<&Value>) -> Option<Sortable> {
    match value? {
        Value::Null => None,
        Value::Bool(b) => Some(Sortable::Bool(*b)),
        Value::Number(n) => n.as_f64().map(Sortable::Number),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(match parse_timestamp(s) {
            Some(ts) => Sortable::Date(ts),
            None => Sortable::Text(s.to_lowercase()),
        }),
        other => Some(Sortable::Text(other.to_string())),
    }
}

/// Accepts `YYYY-MM-DD` and RFC 3339; returns seconds since the epoch
pub fn parse_timestamp(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp());
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(v: Value) -> Record {
        Record::from_value(v).unwrap()
    }

    fn ids(records: &[Record]) -> Vec<String> {
        records.iter().map(|r| r.id().unwrap().to_string()).collect()
    }

    #[test]
    fn parses_multiple_keys() {
        let keys = parse_order("start_date desc, id").unwrap();
        assert_eq!(keys, vec![SortKey::desc("start_date"), SortKey::asc("id")]);
        assert!(parse_order("").unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_column_and_direction() {
        assert!(matches!(parse_order("name; drop"), Err(OrderError::InvalidColumn(_))));
        assert!(matches!(parse_order("name sideways"), Err(OrderError::InvalidDirection { .. })));
    }

    #[test]
    fn id_desc_uses_numeric_identity() {
        let mut records = vec![
            rec(json!({"id": 2})),
            rec(json!({"id": 10})),
            rec(json!({"id": 9})),
        ];
        sort_records(&mut records, &[SortKey::desc("id")]);
        assert_eq!(ids(&records), vec!["10", "9", "2"]);
    }

    #[test]
    fn start_date_desc_is_stable_and_puts_missing_last() {
        let mut records = vec![
            rec(json!({"id": 1, "start_date": "2021-03-01"})),
            rec(json!({"id": 2, "start_date": null})),
            rec(json!({"id": 3, "start_date": "2023-01-15"})),
            rec(json!({"id": 4, "start_date": "2021-03-01"})),
        ];
        sort_records(&mut records, &[SortKey::desc("start_date")]);
        assert_eq!(ids(&records), vec!["3", "1", "4", "2"]);
    }

    #[test]
    fn timestamps_parse_both_forms() {
        assert!(parse_timestamp("2024-02-29").is_some());
        assert!(parse_timestamp("2024-02-29T10:00:00Z").is_some());
        assert!(parse_timestamp("last spring").is_none());
    }
}
