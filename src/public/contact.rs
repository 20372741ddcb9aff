use serde_json::{json, Map, Value};

use crate::client::{OutboundPayload, ResourceClient};
use crate::error::ClientError;
use crate::types::ResourceType;

pub const SENT_MESSAGE: &str = "Message sent successfully! I'll get back to you soon.";
pub const FAILED_MESSAGE: &str = "Failed to send message. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
    Sent(String),
    Failed(String),
}

impl FormStatus {
    pub fn message(&self) -> &str {
        match self {
            FormStatus::Sent(m) | FormStatus::Failed(m) => m,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FormStatus::Sent(_))
    }
}

/// Public contact form. Posts a new message record; one send at a time.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
    status: Option<FormStatus>,
    sending: bool,
}

impl ContactForm {
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn status(&self) -> Option<&FormStatus> {
        self.status.as_ref()
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Start a send. `None` while another send is in flight.
    pub fn begin_send(&mut self) -> Option<OutboundPayload> {
        if self.sending {
            tracing::debug!("Ignoring contact form submit while a send is in flight");
            return None;
        }
        self.sending = true;
        self.status = None;

        let mut fields = Map::new();
        fields.insert("name".to_string(), json!(self.name));
        fields.insert("email".to_string(), json!(self.email));
        fields.insert("message".to_string(), json!(self.message));
        Some(OutboundPayload::json(fields))
    }

    /// Success clears the form; failure keeps what was typed
    pub fn finish_send(&mut self, result: Result<Value, ClientError>) -> &FormStatus {
        self.sending = false;
        let status = match result {
            Ok(_) => {
                self.name.clear();
                self.email.clear();
                self.message.clear();
                FormStatus::Sent(SENT_MESSAGE.to_string())
            }
            Err(e) => {
                tracing::warn!("Contact message failed: {}", e.message());
                FormStatus::Failed(FAILED_MESSAGE.to_string())
            }
        };
        self.status.insert(status)
    }

    pub async fn send_message(&mut self, client: &dyn ResourceClient) -> Option<FormStatus> {
        let payload = self.begin_send()?;
        let result = client.create(ResourceType::Message, payload).await;
        Some(self.finish_send(result).clone())
    }
}
