use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::types::ResourceType;

/// Identity field carried by every persisted record
pub const ID_FIELD: &str = "id";

/// Server-assigned record identity.
///
/// The portfolio API hands out integer keys; anything else is kept as text so
/// a foreign backend still round-trips. Numeric strings normalize to `Int` so
/// `"7"` typed on the command line matches `7` from a listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(RecordId::Int),
            Value::String(s) if !s.trim().is_empty() => s.parse().ok(),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Int(n) => Value::from(*n),
            RecordId::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for RecordId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<i64>() {
            Ok(n) => RecordId::Int(n),
            Err(_) => RecordId::Text(s.to_string()),
        })
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Int(n)
    }
}

/// One row of a resource: identity plus a flat map of field values
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    id: Option<RecordId>,
    fields: Map<String, Value>,
}

impl Record {
    /// Create a not-yet-persisted record
    pub fn new(fields: Map<String, Value>) -> Self {
        let mut record = Self { id: None, fields };
        if let Some(id) = record.fields.remove(ID_FIELD) {
            record.id = RecordId::from_value(&id);
        }
        record
    }

    /// Build from one element of a normalized listing; non-objects are rejected
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::new(map)),
            _ => None,
        }
    }

    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// String view of a field; null and missing both read as `None`
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// True when the field is missing, null, or an empty string
    pub fn is_blank(&self, key: &str) -> bool {
        match self.fields.get(key) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn to_value(&self) -> Value {
        let mut obj = self.fields.clone();
        if let Some(id) = &self.id {
            obj.insert(ID_FIELD.to_string(), id.to_value());
        }
        Value::Object(obj)
    }
}

/// Ordered records of one resource type, unique by identity
#[derive(Debug, Clone)]
pub struct ResourceCollection {
    resource: ResourceType,
    records: Vec<Record>,
}

impl ResourceCollection {
    pub fn new(resource: ResourceType) -> Self {
        Self { resource, records: Vec::new() }
    }

    pub fn resource(&self) -> ResourceType {
        self.resource
    }

    /// Replace the whole collection. Later duplicates of an identity are dropped;
    /// the count of dropped records is returned.
    pub fn replace_all(&mut self, records: Vec<Record>) -> usize {
        let mut seen = HashSet::new();
        let before = records.len();
        self.records = records
            .into_iter()
            .filter(|r| match r.id() {
                Some(id) => seen.insert(id.clone()),
                None => true,
            })
            .collect();

        let dropped = before - self.records.len();
        if dropped > 0 {
            tracing::warn!("Dropped {} duplicate {} record(s) from listing", dropped, self.resource);
        }
        dropped
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id() == Some(id))
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.get(id).is_some()
    }

    pub fn remove(&mut self, id: &RecordId) -> Option<Record> {
        let pos = self.records.iter().position(|r| r.id() == Some(id))?;
        Some(self.records.remove(pos))
    }

    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }
}
