//! In-memory [`ResourceClient`] for unit tests.
//!
//! Records live per resource type; creates get the next integer id, updates
//! merge into the stored object, deletes remove it. Failures can be queued
//! per listing or for the next write.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::client::{OutboundPayload, ResourceClient};
use crate::error::ClientError;
use crate::record::RecordId;
use crate::types::ResourceType;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(ResourceType),
    Create(ResourceType),
    Update(ResourceType, RecordId),
    Delete(ResourceType, RecordId),
}

#[derive(Default)]
struct State {
    tables: HashMap<ResourceType, Vec<Map<String, Value>>>,
    next_id: i64,
    list_failures: HashMap<ResourceType, ClientError>,
    write_failure: Option<ClientError>,
    calls: Vec<Call>,
    payloads: Vec<OutboundPayload>,
}

#[derive(Default)]
pub struct MockResourceClient {
    state: Mutex<State>,
}

impl MockResourceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored rows for `resource`
    pub fn seed(&self, resource: ResourceType, rows: Vec<Value>) {
        let mut state = self.lock();
        let rows: Vec<Map<String, Value>> = rows
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        for row in &rows {
            if let Some(n) = row.get("id").and_then(Value::as_i64) {
                state.next_id = state.next_id.max(n);
            }
        }
        state.tables.insert(resource, rows);
    }

    pub fn seed_one(&self, resource: ResourceType, row: Value) {
        let mut rows: Vec<Value> = self
            .lock()
            .tables
            .get(&resource)
            .map(|t| t.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default();
        rows.push(row);
        self.seed(resource, rows);
    }

    /// Every listing of `resource` fails until `heal_list` is called
    pub fn fail_list(&self, resource: ResourceType, error: ClientError) {
        self.lock().list_failures.insert(resource, error);
    }

    pub fn heal_list(&self, resource: ResourceType) {
        self.lock().list_failures.remove(&resource);
    }

    /// The next create/update/delete fails once
    pub fn fail_next_write(&self, error: ClientError) {
        self.lock().write_failure = Some(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn write_calls(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| !matches!(c, Call::List(_)))
            .count()
    }

    pub fn last_payload(&self) -> Option<OutboundPayload> {
        self.lock().payloads.last().cloned()
    }

    pub fn rows(&self, resource: ResourceType) -> Vec<Value> {
        self.lock()
            .tables
            .get(&resource)
            .map(|t| t.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// What the server would store for a payload: attachments become media paths
fn stored_fields(payload: &OutboundPayload) -> Map<String, Value> {
    let mut fields = payload.fields.clone();
    for (name, attachment) in &payload.attachments {
        fields.insert(name.clone(), json!(format!("/media/{}", attachment.file_name)));
    }
    for name in &payload.cleared {
        fields.insert(name.clone(), Value::Null);
    }
    fields
}

fn position(rows: &[Map<String, Value>], id: &RecordId) -> Option<usize> {
    rows.iter()
        .position(|row| row.get("id").and_then(RecordId::from_value).as_ref() == Some(id))
}

#[async_trait]
impl ResourceClient for MockResourceClient {
    async fn list(&self, resource: ResourceType) -> Result<Value, ClientError> {
        let mut state = self.lock();
        state.calls.push(Call::List(resource));
        if let Some(err) = state.list_failures.get(&resource) {
            return Err(err.clone());
        }
        let rows: Vec<Value> = state
            .tables
            .get(&resource)
            .map(|t| t.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default();
        Ok(json!({ "success": true, "data": rows }))
    }

    async fn create(&self, resource: ResourceType, payload: OutboundPayload) -> Result<Value, ClientError> {
        let mut state = self.lock();
        state.calls.push(Call::Create(resource));
        state.payloads.push(payload.clone());
        if let Some(err) = state.write_failure.take() {
            return Err(err);
        }

        state.next_id += 1;
        let mut row = stored_fields(&payload);
        row.insert("id".to_string(), json!(state.next_id));
        state.tables.entry(resource).or_default().push(row.clone());
        Ok(json!({ "code": "CREATED", "data": row }))
    }

    async fn update(
        &self,
        resource: ResourceType,
        id: &RecordId,
        payload: OutboundPayload,
    ) -> Result<Value, ClientError> {
        let mut state = self.lock();
        state.calls.push(Call::Update(resource, id.clone()));
        state.payloads.push(payload.clone());
        if let Some(err) = state.write_failure.take() {
            return Err(err);
        }

        let rows = state.tables.entry(resource).or_default();
        let idx = position(rows, id).ok_or_else(|| ClientError::Server {
            status: 404,
            message: "Not found.".to_string(),
        })?;
        for (k, v) in stored_fields(&payload) {
            rows[idx].insert(k, v);
        }
        Ok(json!({ "data": rows[idx].clone() }))
    }

    async fn delete(&self, resource: ResourceType, id: &RecordId) -> Result<Value, ClientError> {
        let mut state = self.lock();
        state.calls.push(Call::Delete(resource, id.clone()));
        if let Some(err) = state.write_failure.take() {
            return Err(err);
        }

        let rows = state.tables.entry(resource).or_default();
        match position(rows, id) {
            Some(idx) => {
                rows.remove(idx);
                Ok(Value::Null)
            }
            None => Err(ClientError::Server { status: 404, message: "Not found.".to_string() }),
        }
    }
}
