use thiserror::Error;

use crate::error::ClientError;
use crate::record::RecordId;
use crate::types::ResourceType;

/// Editor errors. None of these are fatal: the controller is always left in a
/// usable state and the user's draft is never discarded by a failure.
#[derive(Debug, Error, Clone)]
pub enum EditorError {
    #[error("{resource} record {id} not found")]
    NotFound { resource: ResourceType, id: RecordId },

    #[error("A save is already in progress")]
    Busy,

    #[error("Cannot {action} while {state}")]
    InvalidState { action: &'static str, state: &'static str },

    #[error("{0} records are read-only here")]
    ReadOnly(ResourceType),

    #[error("Unknown field '{field}' for {resource}")]
    UnknownField { resource: ResourceType, field: String },

    #[error("Invalid value for field '{field}'")]
    InvalidValue { field: String },

    #[error("{0}")]
    Rejected(#[from] ClientError),
}

impl EditorError {
    /// Failures the user can retry without changing anything
    pub fn is_retryable(&self) -> bool {
        matches!(self, EditorError::Busy | EditorError::Rejected(_))
    }
}
