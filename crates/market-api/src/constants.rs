//! Route prefixes shared by route setup and handler annotations.

/// Upload and media streaming routes
pub const FILES_PREFIX: &str = "/files";

/// Storage strategy administration routes
pub const STORAGE_API_PREFIX: &str = "/api/storage";
