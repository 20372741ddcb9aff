pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod editor;
pub mod envelope;
pub mod error;
pub mod order;
pub mod pagination;
pub mod public;
pub mod record;
pub mod resource;
pub mod types;

pub use client::{HttpResourceClient, ResourceClient};
pub use editor::CrudEditorController;
pub use error::ClientError;

#[cfg(test)]
pub mod testing;
