use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::client::{Attachment, OutboundPayload};
use crate::record::Record;
use crate::resource::{FieldKind, ResourceDescriptor};

/// What the user did to a file field during this session
#[derive(Debug, Clone, PartialEq)]
pub enum FileChange {
    Replace(Attachment),
    Clear,
}

/// In-progress field set for a create or edit.
///
/// File fields start unset in both modes; binary content is never pulled back
/// from the server into a draft.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    values: Map<String, Value>,
    files: BTreeMap<String, FileChange>,
}

impl Draft {
    pub fn empty(descriptor: &ResourceDescriptor) -> Self {
        Self {
            values: descriptor.empty_values(),
            files: BTreeMap::new(),
        }
    }

    pub fn from_record(descriptor: &ResourceDescriptor, record: &Record) -> Self {
        Self {
            values: descriptor.values_from(record),
            files: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn file_change(&self, name: &str) -> Option<&FileChange> {
        self.files.get(name)
    }

    pub fn files(&self) -> &BTreeMap<String, FileChange> {
        &self.files
    }

    pub(crate) fn set(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub(crate) fn set_file(&mut self, name: &str, change: FileChange) {
        self.files.insert(name.to_string(), change);
    }

    /// Build the outbound body: every non-file field, new files only, and
    /// explicit clears. Draft-only flags are applied, then left out.
    pub fn to_payload(&self, descriptor: &ResourceDescriptor) -> OutboundPayload {
        let mut payload = OutboundPayload::new(descriptor.encoding);

        for field in descriptor.value_fields().filter(|f| !f.is_draft_only()) {
            let value = self.values.get(field.name).cloned().unwrap_or(Value::Null);
            payload.fields.insert(field.name.to_string(), value);
        }

        for field in descriptor.value_fields() {
            if let FieldKind::CurrentFlag { clears } = field.kind {
                if self.values.get(field.name).and_then(Value::as_bool).unwrap_or(false) {
                    payload.fields.insert(clears.to_string(), Value::Null);
                }
            }
        }

        for (name, change) in &self.files {
            match change {
                FileChange::Replace(attachment) => payload.attachments.push((name.clone(), attachment.clone())),
                FileChange::Clear => payload.cleared.push(name.clone()),
            }
        }

        payload
    }
}
