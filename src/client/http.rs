use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use super::{OutboundPayload, ResourceClient};
use crate::auth::SessionContext;
use crate::config::ApiConfig;
use crate::error::ClientError;
use crate::record::RecordId;
use crate::resource::{PayloadEncoding, ResourceDescriptor};
use crate::types::ResourceType;

/// reqwest-backed client for the portfolio REST API.
///
/// The bearer credential is read from the shared [`SessionContext`] on every
/// call, so a login or logout takes effect without rebuilding the client.
#[derive(Clone)]
pub struct HttpResourceClient {
    http: Client,
    base_url: Url,
    session: Arc<SessionContext>,
    request_logging: bool,
}

impl HttpResourceClient {
    pub fn new(base_url: &str, timeout: Duration, session: Arc<SessionContext>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: parse_base_url(base_url)?,
            session,
            request_logging: false,
        })
    }

    pub fn from_config(api: &ApiConfig, session: Arc<SessionContext>) -> Result<Self, ClientError> {
        let mut client = Self::new(&api.base_url, Duration::from_secs(api.timeout_secs), session)?;
        client.request_logging = api.enable_request_logging;
        Ok(client)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// `{base}/{endpoint}` or `{base}/{endpoint}{id}/`
    pub fn resource_url(&self, resource: ResourceType, id: Option<&RecordId>) -> Result<Url, ClientError> {
        let endpoint = ResourceDescriptor::for_type(resource).endpoint;
        let path = match id {
            Some(id) => format!("{}{}/", endpoint, id),
            None => endpoint.to_string(),
        };
        self.base_url
            .join(&path)
            .map_err(|e| ClientError::transport(format!("invalid resource URL '{}': {}", path, e)))
    }

    async fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request_id = Uuid::new_v4();
        if self.request_logging {
            tracing::debug!("{} {} (request {})", method, url, request_id);
        }

        let mut builder = self
            .http
            .request(method, url)
            .header("X-Request-Id", request_id.to_string());
        if let Some(token) = self.session.bearer().await {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Value, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        let body: Option<Value> = if bytes.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            match serde_json::from_slice(&bytes) {
                Ok(v) => Some(v),
                Err(e) if status.is_success() => return Err(ClientError::Decode(e.to_string())),
                Err(_) => Some(Value::String(String::from_utf8_lossy(&bytes).into_owned())),
            }
        };

        if status.is_success() {
            Ok(body.unwrap_or(Value::Null))
        } else {
            let err = ClientError::from_status(status.as_u16(), body.as_ref(), status.canonical_reason());
            tracing::debug!("Request failed with {}: {}", status, err.message());
            Err(err)
        }
    }

    async fn send_payload(&self, method: Method, url: Url, payload: OutboundPayload) -> Result<Value, ClientError> {
        let builder = self.request(method, url).await;
        let builder = match payload.effective_encoding() {
            PayloadEncoding::Json => builder.json(&payload.to_json()),
            PayloadEncoding::Multipart => builder.multipart(multipart_form(payload)?),
        };
        self.send(builder).await
    }
}

#[async_trait]
impl ResourceClient for HttpResourceClient {
    async fn list(&self, resource: ResourceType) -> Result<Value, ClientError> {
        let url = self.resource_url(resource, None)?;
        let builder = self.request(Method::GET, url).await;
        self.send(builder).await
    }

    async fn create(&self, resource: ResourceType, payload: OutboundPayload) -> Result<Value, ClientError> {
        let url = self.resource_url(resource, None)?;
        self.send_payload(Method::POST, url, payload).await
    }

    async fn update(
        &self,
        resource: ResourceType,
        id: &RecordId,
        payload: OutboundPayload,
    ) -> Result<Value, ClientError> {
        // The backend only implements PUT and treats it as a partial update
        let url = self.resource_url(resource, Some(id))?;
        self.send_payload(Method::PUT, url, payload).await
    }

    async fn delete(&self, resource: ResourceType, id: &RecordId) -> Result<Value, ClientError> {
        let url = self.resource_url(resource, Some(id))?;
        let builder = self.request(Method::DELETE, url).await;
        self.send(builder).await
    }
}

/// Base URLs must end in `/` or `Url::join` drops the last path segment
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, ClientError> {
    let mut normalized = base_url.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Url::parse(&normalized).map_err(|e| ClientError::transport(format!("invalid API base URL '{}': {}", base_url, e)))
}

fn multipart_form(payload: OutboundPayload) -> Result<Form, ClientError> {
    let mut form = Form::new();
    for (name, value) in payload.fields {
        form = form.text(name, form_text(&value));
    }
    for name in payload.cleared {
        form = form.text(name, String::new());
    }
    for (name, attachment) in payload.attachments {
        let mut part = Part::bytes(attachment.bytes).file_name(attachment.file_name);
        if let Some(ct) = attachment.content_type {
            part = part
                .mime_str(&ct)
                .map_err(|e| ClientError::transport(format!("invalid content type '{}': {}", ct, e)))?;
        }
        form = form.part(name, part);
    }
    Ok(form)
}

/// Form-data text for a JSON value; null travels as an empty string
fn form_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
