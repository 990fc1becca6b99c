//! Error types module
//!
//! This module provides the application-level error type used by the HTTP layer.
//! Storage failures are described by `market_storage::StorageError` and converted
//! into `AppError` at the API boundary.

/// Severity at which an error is logged when it reaches the HTTP layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Client mistakes: bad input, missing media
    Debug,
    /// Degraded but expected: unsatisfiable ranges, unavailable strategies
    Warn,
    /// Server-side failures
    Error,
}

/// How one class of error is rendered to clients.
#[derive(Debug)]
pub struct ErrorProfile {
    pub status: u16,
    pub code: &'static str,
    pub recoverable: bool,
    pub action: Option<&'static str>,
    /// Detail stays out of client responses
    pub sensitive: bool,
    pub level: LogLevel,
}

static STORAGE_FAILURE: ErrorProfile = ErrorProfile {
    status: 500,
    code: "STORAGE_ERROR",
    recoverable: true,
    action: Some("Retry after a short delay"),
    sensitive: true,
    level: LogLevel::Error,
};

static INVALID_INPUT: ErrorProfile = ErrorProfile {
    status: 400,
    code: "INVALID_INPUT",
    recoverable: false,
    action: Some("Check the form fields and file, then try again"),
    sensitive: false,
    level: LogLevel::Debug,
};

static NOT_FOUND: ErrorProfile = ErrorProfile {
    status: 404,
    code: "NOT_FOUND",
    recoverable: false,
    action: Some("Verify the media exists"),
    sensitive: false,
    level: LogLevel::Debug,
};

static TOO_LARGE: ErrorProfile = ErrorProfile {
    status: 413,
    code: "PAYLOAD_TOO_LARGE",
    recoverable: false,
    action: Some("Upload a smaller file"),
    sensitive: false,
    level: LogLevel::Debug,
};

static RANGE_NOT_SATISFIABLE: ErrorProfile = ErrorProfile {
    status: 416,
    code: "RANGE_NOT_SATISFIABLE",
    recoverable: false,
    action: Some("Request a byte range within the resource size"),
    sensitive: false,
    level: LogLevel::Warn,
};

static UNAVAILABLE: ErrorProfile = ErrorProfile {
    status: 503,
    code: "SERVICE_UNAVAILABLE",
    recoverable: true,
    action: Some("Wait and retry, or select another storage strategy"),
    sensitive: false,
    level: LogLevel::Warn,
};

static MIGRATION_FAILED: ErrorProfile = ErrorProfile {
    status: 500,
    code: "MIGRATION_FAILED",
    recoverable: true,
    action: Some("Fix or remove the failing key and retry the migration"),
    sensitive: false,
    level: LogLevel::Error,
};

static INTERNAL: ErrorProfile = ErrorProfile {
    status: 500,
    code: "INTERNAL_ERROR",
    recoverable: true,
    action: Some("Retry after a short delay"),
    sensitive: true,
    level: LogLevel::Error,
};

/// Presentation of an error: everything but the message comes from its [`ErrorProfile`].
pub trait ErrorMetadata {
    fn profile(&self) -> &'static ErrorProfile;

    /// Message safe to show to clients
    fn client_message(&self) -> String;

    fn http_status_code(&self) -> u16 {
        self.profile().status
    }

    fn error_code(&self) -> &'static str {
        self.profile().code
    }

    fn is_recoverable(&self) -> bool {
        self.profile().recoverable
    }

    fn suggested_action(&self) -> Option<&'static str> {
        self.profile().action
    }

    fn is_sensitive(&self) -> bool {
        self.profile().sensitive
    }

    fn log_level(&self) -> LogLevel {
        self.profile().level
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Range not satisfiable: {0}")]
    RangeNotSatisfiable(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Migration failed for key '{key}': {message}")]
    MigrationFailed { key: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{message}")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(source: anyhow::Error) -> Self {
        let message = source.to_string();
        AppError::InternalWithSource { message, source }
    }
}

impl ErrorMetadata for AppError {
    fn profile(&self) -> &'static ErrorProfile {
        match self {
            AppError::Storage(_) => &STORAGE_FAILURE,
            AppError::InvalidInput(_) => &INVALID_INPUT,
            AppError::NotFound(_) => &NOT_FOUND,
            AppError::PayloadTooLarge(_) => &TOO_LARGE,
            AppError::RangeNotSatisfiable(_) => &RANGE_NOT_SATISFIABLE,
            AppError::ServiceUnavailable(_) => &UNAVAILABLE,
            AppError::MigrationFailed { .. } => &MIGRATION_FAILED,
            AppError::Internal(_) | AppError::InternalWithSource { .. } => &INTERNAL,
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Storage(_) => "Storage operation failed".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
            AppError::MigrationFailed { key, .. } => {
                format!("Migration failed for key '{}'", key)
            }
            AppError::InvalidInput(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::RangeNotSatisfiable(msg)
            | AppError::ServiceUnavailable(msg) => msg.clone(),
        }
    }
}

impl AppError {
    /// Short variant name used in logs and non-production error bodies.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Storage(_) => "storage",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::NotFound(_) => "not_found",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::RangeNotSatisfiable(_) => "range_not_satisfiable",
            AppError::ServiceUnavailable(_) => "service_unavailable",
            AppError::MigrationFailed { .. } => "migration_failed",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "internal",
        }
    }

    /// Message with the full source chain, for non-production responses.
    pub fn detailed_message(&self) -> String {
        match self {
            AppError::InternalWithSource { message, source } => {
                format!("{}: {:#}", message, source)
            }
            other => other.to_string(),
        }
    }
}
