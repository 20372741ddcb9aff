//! Resource client boundary.
//!
//! Everything that talks to the portfolio API goes through [`ResourceClient`].
//! Editors and the public view only ever see raw response bodies and
//! [`ClientError`]; encoding, bearer injection and transport live behind the trait.

pub mod http;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::ClientError;
use crate::record::RecordId;
use crate::resource::PayloadEncoding;
use crate::types::ResourceType;

pub use http::HttpResourceClient;

/// A file chosen for upload in this editing session
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name).map(str::to_string);
        Self { file_name, content_type, bytes }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

fn guess_content_type(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// Body of a create or update call
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundPayload {
    pub encoding: PayloadEncoding,
    /// Every non-file field of the draft
    pub fields: Map<String, Value>,
    /// Newly chosen files only
    pub attachments: Vec<(String, Attachment)>,
    /// File fields the user explicitly removed
    pub cleared: Vec<String>,
}

impl OutboundPayload {
    pub fn new(encoding: PayloadEncoding) -> Self {
        Self {
            encoding,
            fields: Map::new(),
            attachments: Vec::new(),
            cleared: Vec::new(),
        }
    }

    pub fn json(fields: Map<String, Value>) -> Self {
        Self { fields, ..Self::new(PayloadEncoding::Json) }
    }

    pub fn has_attachment(&self, field: &str) -> bool {
        self.attachments.iter().any(|(name, _)| name == field)
    }

    /// Multipart is forced whenever a file rides along
    pub fn effective_encoding(&self) -> PayloadEncoding {
        if self.attachments.is_empty() {
            self.encoding
        } else {
            PayloadEncoding::Multipart
        }
    }

    /// JSON body: fields plus explicit nulls for cleared files
    pub fn to_json(&self) -> Value {
        let mut body = self.fields.clone();
        for name in &self.cleared {
            body.insert(name.clone(), Value::Null);
        }
        Value::Object(body)
    }
}

/// List/create/update/delete per resource type. Responses are raw bodies;
/// `Value::Null` stands in for an empty body (204).
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn list(&self, resource: ResourceType) -> Result<Value, ClientError>;

    async fn create(&self, resource: ResourceType, payload: OutboundPayload) -> Result<Value, ClientError>;

    async fn update(
        &self,
        resource: ResourceType,
        id: &RecordId,
        payload: OutboundPayload,
    ) -> Result<Value, ClientError>;

    async fn delete(&self, resource: ResourceType, id: &RecordId) -> Result<Value, ClientError>;
}
