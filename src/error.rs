// Resource Client Error Types
use serde_json::Value;

/// Failure of a call across the resource client boundary.
///
/// Transport failures and structured server rejections are both "operation
/// failed" to the editor; the distinction is kept so the human-readable
/// message can be forwarded unchanged.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    // Network unreachable, timeout, TLS, connection reset
    #[error("{0}")]
    Transport(String),

    // 400 / 422: server rejected the payload
    #[error("{message}")]
    Validation { status: u16, message: String },

    // 401 / 403
    #[error("{message}")]
    Unauthorized { status: u16, message: String },

    // 404, 5xx and anything else non-success
    #[error("{message}")]
    Server { status: u16, message: String },

    // Success status but the body was not JSON
    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl ClientError {
    /// Classify a non-success HTTP response by status, pulling the message out of its body
    pub fn from_status(status: u16, body: Option<&Value>, reason: Option<&str>) -> Self {
        let message = message_from_body(body)
            .or_else(|| reason.map(|r| r.to_string()))
            .unwrap_or_else(|| format!("Request failed with status {}", status));

        match status {
            400 | 422 => ClientError::Validation { status, message },
            401 | 403 => ClientError::Unauthorized { status, message },
            _ => ClientError::Server { status, message },
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        ClientError::Transport(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation { status: 400, message: message.into() }
    }

    /// HTTP status when the server answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Transport(_) | ClientError::Decode(_) => None,
            ClientError::Validation { status, .. }
            | ClientError::Unauthorized { status, .. }
            | ClientError::Server { status, .. } => Some(*status),
        }
    }

    /// Human-readable message, forwarded to the editor session as-is
    pub fn message(&self) -> String {
        match self {
            ClientError::Transport(msg) => msg.clone(),
            ClientError::Validation { message, .. } => message.clone(),
            ClientError::Unauthorized { message, .. } => message.clone(),
            ClientError::Server { message, .. } => message.clone(),
            ClientError::Decode(msg) => format!("Invalid response body: {}", msg),
        }
    }

    /// Error code for machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::Validation { .. } => "VALIDATION_ERROR",
            ClientError::Unauthorized { .. } => "UNAUTHORIZED",
            ClientError::Server { status: 404, .. } => "NOT_FOUND",
            ClientError::Server { .. } => "SERVER_ERROR",
            ClientError::Decode(_) => "INVALID_RESPONSE",
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// Pull a message out of an error body: `message`, then `detail`, then the body itself
pub fn message_from_body(body: Option<&Value>) -> Option<String> {
    let body = body?;
    if body.is_null() {
        return None;
    }
    for key in ["message", "detail", "error"] {
        if let Some(msg) = body.get(key).and_then(Value::as_str) {
            if !msg.is_empty() {
                return Some(msg.to_string());
            }
        }
    }
    match body {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validation_status_keeps_server_message() {
        let body = json!({"message": "Title is required"});
        let err = ClientError::from_status(400, Some(&body), Some("Bad Request"));
        assert!(matches!(err, ClientError::Validation { status: 400, .. }));
        assert_eq!(err.message(), "Title is required");
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn field_error_body_is_serialized_whole() {
        let body = json!({"title": ["This field may not be blank."]});
        let err = ClientError::from_status(422, Some(&body), None);
        assert!(err.message().contains("may not be blank"));
    }

    #[test]
    fn falls_back_to_reason_phrase() {
        let err = ClientError::from_status(503, None, Some("Service Unavailable"));
        assert_eq!(err.message(), "Service Unavailable");
        assert_eq!(err.status_code(), Some(503));
    }

    #[test]
    fn transport_has_no_status() {
        let err = ClientError::transport("connection refused");
        assert_eq!(err.status_code(), None);
        assert_eq!(err.to_string(), "connection refused");
    }
}
