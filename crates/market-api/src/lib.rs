//! Market API Library
//!
//! This crate provides the HTTP handlers for media upload, range streaming and
//! storage strategy administration, plus application setup.

// Module declarations
mod api_doc;
pub mod constants;
mod handlers;
mod telemetry;
mod utils;

// Public modules
pub mod error;
pub mod services;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::media_registry::{InMemoryMediaRegistry, MediaRegistry};
pub use state::AppState;
