//! Generic CRUD editor.
//!
//! One controller per resource type drives fetch, normalize, display, draft,
//! submit and refetch. State lives in [`EditorState`]; every operation checks
//! its transition guard first, so a second submit while one is in flight and a
//! load response that is no longer the newest are both structurally ignored.
//!
//! Long-running operations come in two forms. The async methods (`load`,
//! `submit`, `delete`) run to completion. The split-phase methods
//! (`issue_load`/`apply_load`, `begin_submit`/`finish_submit`) let an event
//! loop interleave requests while keeping the same guards.

pub mod draft;
pub mod error;

use serde_json::Value;
use std::sync::Arc;

use crate::client::{Attachment, OutboundPayload, ResourceClient};
use crate::envelope::{normalize_records, single_record};
use crate::error::ClientError;
use crate::order::{sort_records, SortKey};
use crate::record::{RecordId, ResourceCollection};
use crate::resource::ResourceDescriptor;
use crate::types::ResourceType;

pub use draft::{Draft, FileChange};
pub use error::EditorError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftMode {
    Create,
    Edit(RecordId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorState {
    Listing,
    Drafting {
        mode: DraftMode,
        draft: Draft,
        /// Message from the last failed submit, if any
        error: Option<String>,
    },
    Submitting {
        mode: DraftMode,
        draft: Draft,
    },
}

impl EditorState {
    fn name(&self) -> &'static str {
        match self {
            EditorState::Listing => "listing",
            EditorState::Drafting { .. } => "drafting",
            EditorState::Submitting { .. } => "submitting",
        }
    }

    pub fn draft(&self) -> Option<&Draft> {
        match self {
            EditorState::Listing => None,
            EditorState::Drafting { draft, .. } | EditorState::Submitting { draft, .. } => Some(draft),
        }
    }

    pub fn mode(&self) -> Option<&DraftMode> {
        match self {
            EditorState::Listing => None,
            EditorState::Drafting { mode, .. } | EditorState::Submitting { mode, .. } => Some(mode),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            EditorState::Drafting { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, EditorState::Submitting { .. })
    }
}

/// Handle for one issued list request; only the newest one may be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Applied { count: usize },
    /// Load failed; the collection is now empty and a diagnostic is recorded
    Failed { message: String },
    /// A newer load was issued (or a write invalidated this one); response dropped
    Stale,
}

/// An outbound create/update built by `begin_submit`
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    ticket: u64,
    resource: ResourceType,
    mode: DraftMode,
    payload: OutboundPayload,
}

impl SubmitRequest {
    pub fn mode(&self) -> &DraftMode {
        &self.mode
    }

    pub fn payload(&self) -> &OutboundPayload {
        &self.payload
    }

    pub async fn send(&self, client: &dyn ResourceClient) -> Result<Value, ClientError> {
        match &self.mode {
            DraftMode::Create => client.create(self.resource, self.payload.clone()).await,
            DraftMode::Edit(id) => client.update(self.resource, id, self.payload.clone()).await,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Saved { id: Option<RecordId> },
    /// Already submitting; nothing was sent
    Ignored,
    /// The session was cancelled while the request was in flight
    Stale,
}

pub struct CrudEditorController {
    descriptor: &'static ResourceDescriptor,
    client: Arc<dyn ResourceClient>,
    collection: ResourceCollection,
    order: Vec<SortKey>,
    state: EditorState,
    load_generation: u64,
    submit_generation: u64,
    reload_pending: bool,
    diagnostic: Option<String>,
}

impl CrudEditorController {
    pub fn new(resource: ResourceType, client: Arc<dyn ResourceClient>) -> Self {
        let descriptor = ResourceDescriptor::for_type(resource);
        Self {
            descriptor,
            client,
            collection: ResourceCollection::new(resource),
            order: descriptor.default_order(),
            state: EditorState::Listing,
            load_generation: 0,
            submit_generation: 0,
            reload_pending: false,
            diagnostic: None,
        }
    }

    pub fn resource(&self) -> ResourceType {
        self.descriptor.resource
    }

    pub fn descriptor(&self) -> &'static ResourceDescriptor {
        self.descriptor
    }

    pub fn client(&self) -> &Arc<dyn ResourceClient> {
        &self.client
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn records(&self) -> &ResourceCollection {
        &self.collection
    }

    /// Non-blocking note from the last failed load or delete
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    pub fn reload_pending(&self) -> bool {
        self.reload_pending
    }

    /// Change the display order and re-sort what is loaded
    pub fn set_order(&mut self, order: Vec<SortKey>) {
        self.order = order;
        sort_records(self.collection.records_mut(), &self.order);
    }

    // ---- load -------------------------------------------------------------

    pub fn issue_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        LoadTicket(self.load_generation)
    }

    /// Apply a list response. The collection is replaced wholesale; a failure
    /// empties it rather than leaving a stale copy on screen.
    pub fn apply_load(&mut self, ticket: LoadTicket, result: Result<Value, ClientError>) -> LoadOutcome {
        if ticket.0 != self.load_generation {
            tracing::debug!(
                "Discarding stale {} listing (request {}, latest {})",
                self.resource(),
                ticket.0,
                self.load_generation
            );
            return LoadOutcome::Stale;
        }

        self.reload_pending = false;
        match result {
            Ok(body) => {
                let mut records = normalize_records(Some(&body));
                sort_records(&mut records, &self.order);
                self.collection.replace_all(records);
                self.diagnostic = None;
                LoadOutcome::Applied { count: self.collection.len() }
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", self.resource(), e.message());
                self.collection.clear();
                let message = e.message();
                self.diagnostic = Some(message.clone());
                LoadOutcome::Failed { message }
            }
        }
    }

    pub async fn load(&mut self) -> LoadOutcome {
        let ticket = self.issue_load();
        let result = self.client.list(self.resource()).await;
        self.apply_load(ticket, result)
    }

    /// Run the reconciling load scheduled by a successful write, if any
    pub async fn reconcile(&mut self) -> Option<LoadOutcome> {
        if self.reload_pending {
            Some(self.load().await)
        } else {
            None
        }
    }

    fn invalidate_loads(&mut self) {
        self.load_generation += 1;
    }

    // ---- drafting ---------------------------------------------------------

    pub fn begin_create(&mut self) -> Result<(), EditorError> {
        self.guard_not_submitting()?;
        if !self.descriptor.creatable {
            return Err(EditorError::ReadOnly(self.resource()));
        }
        self.state = EditorState::Drafting {
            mode: DraftMode::Create,
            draft: Draft::empty(self.descriptor),
            error: None,
        };
        Ok(())
    }

    pub fn begin_edit(&mut self, id: &RecordId) -> Result<(), EditorError> {
        self.guard_not_submitting()?;
        if !self.descriptor.editable {
            return Err(EditorError::ReadOnly(self.resource()));
        }
        let record = self.collection.get(id).ok_or_else(|| EditorError::NotFound {
            resource: self.resource(),
            id: id.clone(),
        })?;
        let draft = Draft::from_record(self.descriptor, record);
        self.state = EditorState::Drafting {
            mode: DraftMode::Edit(id.clone()),
            draft,
            error: None,
        };
        Ok(())
    }

    /// Single-record resources: edit the existing record, or create the first one
    pub fn begin_singleton(&mut self) -> Result<(), EditorError> {
        match self.collection.first().and_then(|r| r.id()).cloned() {
            Some(id) => self.begin_edit(&id),
            None => self.begin_create(),
        }
    }

    /// Back to listing, dropping the draft. Always allowed.
    pub fn cancel(&mut self) {
        if self.state.is_submitting() {
            // The in-flight response no longer belongs to any session
            self.submit_generation += 1;
        }
        self.state = EditorState::Listing;
    }

    pub fn update_draft_field(&mut self, name: &str, value: Value) -> Result<(), EditorError> {
        let resource = self.resource();
        let field = self.descriptor.field(name).ok_or_else(|| EditorError::UnknownField {
            resource,
            field: name.to_string(),
        })?;
        if field.is_file() || !field.accepts(&value) {
            return Err(EditorError::InvalidValue { field: name.to_string() });
        }

        let clears = match field.kind {
            crate::resource::FieldKind::CurrentFlag { clears } if value.as_bool() == Some(true) => Some(clears),
            _ => None,
        };

        let draft = self.draft_mut("edit a field")?;
        draft.set(name, value);
        if let Some(clears) = clears {
            draft.set(clears, Value::String(String::new()));
        }
        Ok(())
    }

    pub fn attach_file(&mut self, name: &str, attachment: Attachment) -> Result<(), EditorError> {
        self.require_file_field(name)?;
        self.draft_mut("attach a file")?.set_file(name, FileChange::Replace(attachment));
        Ok(())
    }

    /// Explicitly remove the stored file on the next submit
    pub fn clear_file(&mut self, name: &str) -> Result<(), EditorError> {
        self.require_file_field(name)?;
        self.draft_mut("clear a file")?.set_file(name, FileChange::Clear);
        Ok(())
    }

    // ---- submit -----------------------------------------------------------

    /// Move to `Submitting` and build the outbound request.
    /// Returns `Ok(None)` when a submit is already in flight.
    pub fn begin_submit(&mut self) -> Result<Option<SubmitRequest>, EditorError> {
        match std::mem::replace(&mut self.state, EditorState::Listing) {
            EditorState::Drafting { mode, draft, .. } => {
                self.submit_generation += 1;
                let request = SubmitRequest {
                    ticket: self.submit_generation,
                    resource: self.resource(),
                    mode: mode.clone(),
                    payload: draft.to_payload(self.descriptor),
                };
                tracing::debug!("Submitting {} ({:?})", self.resource(), mode);
                self.state = EditorState::Submitting { mode, draft };
                Ok(Some(request))
            }
            submitting @ EditorState::Submitting { .. } => {
                tracing::debug!("Ignoring duplicate submit for {}", self.resource());
                self.state = submitting;
                Ok(None)
            }
            EditorState::Listing => Err(EditorError::InvalidState { action: "submit", state: "listing" }),
        }
    }

    /// Apply the result of a request from `begin_submit`. On failure the draft
    /// is restored with the server's message attached.
    pub fn finish_submit(
        &mut self,
        request: &SubmitRequest,
        result: Result<Value, ClientError>,
    ) -> Result<SubmitOutcome, EditorError> {
        let current = request.ticket == self.submit_generation && self.state.is_submitting();

        if !current {
            match &result {
                Ok(_) => {
                    // Saved after the user moved on; the listing still has to catch up
                    self.invalidate_loads();
                    self.reload_pending = true;
                }
                Err(e) => tracing::warn!("Dropped failed {} save after cancel: {}", self.resource(), e.message()),
            }
            return Ok(SubmitOutcome::Stale);
        }

        let EditorState::Submitting { mode, draft } = std::mem::replace(&mut self.state, EditorState::Listing) else {
            return Ok(SubmitOutcome::Stale);
        };

        match result {
            Ok(body) => {
                let id = match &mode {
                    DraftMode::Edit(id) => Some(id.clone()),
                    DraftMode::Create => single_record(Some(&body)).and_then(|r| r.id().cloned()),
                };
                tracing::info!("Saved {} {}", self.resource(), id.as_ref().map(|i| i.to_string()).unwrap_or_default());
                self.invalidate_loads();
                self.reload_pending = true;
                Ok(SubmitOutcome::Saved { id })
            }
            Err(e) => {
                tracing::warn!("Failed to save {}: {}", self.resource(), e.message());
                self.state = EditorState::Drafting {
                    mode,
                    draft,
                    error: Some(e.message()),
                };
                Err(EditorError::Rejected(e))
            }
        }
    }

    /// Submit the current draft and, on success, reload the listing
    pub async fn submit(&mut self) -> Result<SubmitOutcome, EditorError> {
        let Some(request) = self.begin_submit()? else {
            return Ok(SubmitOutcome::Ignored);
        };
        let result = request.send(self.client.as_ref()).await;
        let outcome = self.finish_submit(&request, result)?;
        self.reconcile().await;
        Ok(outcome)
    }

    // ---- delete -----------------------------------------------------------

    /// Delete a record the caller has already confirmed. On success it is removed
    /// locally at once and a reconciling load is scheduled (see `reconcile`).
    pub async fn delete(&mut self, id: &RecordId) -> Result<(), EditorError> {
        self.guard_not_submitting()?;
        if !self.collection.contains(id) {
            return Err(EditorError::NotFound { resource: self.resource(), id: id.clone() });
        }

        match self.client.delete(self.resource(), id).await {
            Ok(_) => {
                self.collection.remove(id);
                self.invalidate_loads();
                self.reload_pending = true;
                if self.state.mode() == Some(&DraftMode::Edit(id.clone())) {
                    self.state = EditorState::Listing;
                }
                tracing::info!("Deleted {} {}", self.resource(), id);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to delete {} {}: {}", self.resource(), id, e.message());
                self.diagnostic = Some(e.message());
                Err(EditorError::Rejected(e))
            }
        }
    }

    // ---- guards -----------------------------------------------------------

    fn guard_not_submitting(&self) -> Result<(), EditorError> {
        if self.state.is_submitting() {
            Err(EditorError::Busy)
        } else {
            Ok(())
        }
    }

    fn draft_mut(&mut self, action: &'static str) -> Result<&mut Draft, EditorError> {
        match &mut self.state {
            EditorState::Drafting { draft, .. } => Ok(draft),
            EditorState::Submitting { .. } => Err(EditorError::Busy),
            EditorState::Listing => Err(EditorError::InvalidState { action, state: "listing" }),
        }
    }

    fn require_file_field(&self, name: &str) -> Result<(), EditorError> {
        match self.descriptor.field(name) {
            Some(f) if f.is_file() => Ok(()),
            Some(_) => Err(EditorError::InvalidValue { field: name.to_string() }),
            None => Err(EditorError::UnknownField { resource: self.resource(), field: name.to_string() }),
        }
    }
}

impl std::fmt::Debug for CrudEditorController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrudEditorController")
            .field("resource", &self.resource())
            .field("state", &self.state.name())
            .field("records", &self.collection.len())
            .field("reload_pending", &self.reload_pending)
            .finish()
    }
}
