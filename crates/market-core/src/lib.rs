//! Market Core Library
//!
//! This crate provides the domain types, error types, and configuration shared by
//! the storage library and the HTTP API of the marketplace media subsystem.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, MediaPolicyConfig, ObjectStoreConfig, StorageConfig};
pub use error::{AppError, ErrorMetadata, ErrorProfile, LogLevel};
pub use models::{MediaType, OwnerId, UploadTarget};
pub use storage_types::StorageBackend;
