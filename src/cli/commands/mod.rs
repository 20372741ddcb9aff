pub mod auth;
pub mod dashboard;
pub mod data;
pub mod public;
pub mod theme;
