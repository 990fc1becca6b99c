//! Rendering of [`AppError`] as HTTP responses.
//!
//! Handlers return `Result<_, HttpAppError>`; storage and policy errors convert
//! through `From` so every failure gets the same JSON body and log line.

use std::sync::OnceLock;

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use market_core::{AppError, ErrorMetadata, LogLevel};
use market_storage::{PolicyViolation, StorageError};
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

static PRODUCTION: OnceLock<bool> = OnceLock::new();

/// Hide error details from responses for the rest of the process.
/// Only the first call has an effect.
pub fn set_production_mode(production: bool) {
    let _ = PRODUCTION.set(production);
}

fn production_mode() -> bool {
    PRODUCTION.get().copied().unwrap_or(false)
}

/// JSON body of every error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Internal detail; omitted in production and for sensitive errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Stable code such as `RANGE_NOT_SATISFIABLE`
    pub code: String,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    fn from_app_error(app_error: &AppError, with_details: bool) -> Self {
        let (details, error_type) = if with_details {
            (
                Some(app_error.detailed_message()),
                Some(app_error.error_type().to_string()),
            )
        } else {
            (None, None)
        };

        Self {
            error: app_error.client_message(),
            details,
            error_type,
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(str::to_string),
        }
    }
}

/// [`AppError`] lives in market-core, so the axum response impl needs a local newtype.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl HttpAppError {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        Self(AppError::from(err))
    }
}

impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// `Json<T>` whose rejections render as [`ErrorResponse`] with status 400.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

fn log_error(error: &AppError, status: StatusCode) {
    let error_type = error.error_type();
    let status = status.as_u16();
    match error.log_level() {
        LogLevel::Debug => tracing::debug!(error = %error, error_type, status, "Request rejected"),
        LogLevel::Warn => tracing::warn!(error = %error, error_type, status, "Request rejected"),
        LogLevel::Error => tracing::error!(error = %error, error_type, status, "Request failed"),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = self.status();
        log_error(&self.0, status);

        let with_details = !production_mode() && !self.0.is_sensitive();
        let body = ErrorResponse::from_app_error(&self.0, with_details);

        (status, Json(body)).into_response()
    }
}

impl From<PolicyViolation> for HttpAppError {
    fn from(err: PolicyViolation) -> Self {
        let app = match err {
            PolicyViolation::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            PolicyViolation::EmptyFile => AppError::InvalidInput("File is empty".to_string()),
            other => AppError::InvalidInput(other.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("File not found: {}", key)),
            StorageError::InvalidRange { .. } => AppError::RangeNotSatisfiable(err.to_string()),
            StorageError::PolicyViolation(violation) => return violation.into(),
            StorageError::UnknownStrategy(name) => {
                AppError::InvalidInput(format!("Unknown storage strategy: {}", name))
            }
            StorageError::Unavailable(_) | StorageError::NoActiveStrategy => {
                AppError::ServiceUnavailable(err.to_string())
            }
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::MigrationFailed { key, source } => AppError::MigrationFailed {
                key,
                message: source.to_string(),
            },
            StorageError::Io(e) => AppError::Storage(format!("IO error: {}", e)),
            StorageError::Backend(msg) => AppError::Storage(msg),
            StorageError::Config(msg) => AppError::Internal(msg),
        };
        HttpAppError(app)
    }
}
