//! Shotrelay API Library
//!
//! This crate provides the HTTP handlers, error responses, and application
//! setup for the screenshot transform-and-relay service.

mod api_doc;

// Public modules
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod utils;

// Re-exports
pub use error::ErrorResponse;
pub use state::AppState;
