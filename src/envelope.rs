//! Response envelope normalization.
//!
//! The portfolio backend wraps listings inconsistently: the custom response
//! class returns `{ "success": .., "data": [...] }`, stock list views return a
//! bare array, and paginated views return `{ "count": .., "results": [...] }`.
//! Some endpoints nest the paginated form inside the custom one. Every shape is
//! resolved here, once, into a plain ordered list.

use serde_json::Value;

use crate::record::Record;

const DATA_FIELD: &str = "data";
const RESULTS_FIELD: &str = "results";

/// Known envelope shapes, in resolution order
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `{ "data": [...] }`
    Data(Vec<Value>),
    /// `{ "data": { "results": [...] } }`
    PagedData(Vec<Value>),
    /// `[...]`
    Bare(Vec<Value>),
    /// `{ "results": [...] }`
    Results(Vec<Value>),
    /// Absent body, null, scalar, or an object with none of the above
    Unrecognized,
}

impl Envelope {
    /// Discriminate a response body. First matching shape wins.
    pub fn classify(body: Option<&Value>) -> Self {
        let Some(body) = body else {
            return Envelope::Unrecognized;
        };

        match body.get(DATA_FIELD) {
            Some(Value::Array(items)) => return Envelope::Data(items.clone()),
            Some(nested @ Value::Object(_)) => {
                if let Some(Value::Array(items)) = nested.get(RESULTS_FIELD) {
                    return Envelope::PagedData(items.clone());
                }
            }
            _ => {}
        }

        if let Value::Array(items) = body {
            return Envelope::Bare(items.clone());
        }

        if let Some(Value::Array(items)) = body.get(RESULTS_FIELD) {
            return Envelope::Results(items.clone());
        }

        Envelope::Unrecognized
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Envelope::Unrecognized)
    }

    pub fn into_items(self) -> Vec<Value> {
        match self {
            Envelope::Data(items)
            | Envelope::PagedData(items)
            | Envelope::Bare(items)
            | Envelope::Results(items) => items,
            Envelope::Unrecognized => Vec::new(),
        }
    }
}

/// Ordered payload items of a response body; empty when the shape is unknown
pub fn normalize(body: Option<&Value>) -> Vec<Value> {
    Envelope::classify(body).into_items()
}

/// Normalize and keep only the object items as records, preserving order
pub fn normalize_records(body: Option<&Value>) -> Vec<Record> {
    let items = normalize(body);
    let total = items.len();
    let records: Vec<Record> = items.into_iter().filter_map(Record::from_value).collect();
    if records.len() < total {
        tracing::debug!("Skipped {} non-object item(s) in listing", total - records.len());
    }
    records
}

/// Unwrap a single-object response (`{ "data": {...} }` or the object itself)
pub fn single_record(body: Option<&Value>) -> Option<Record> {
    let body = body?;
    match body.get(DATA_FIELD) {
        Some(inner @ Value::Object(_)) => Record::from_value(inner.clone()),
        Some(Value::Array(items)) => items.first().cloned().and_then(Record::from_value),
        _ => Record::from_value(body.clone()),
    }
}
