//! Error returned by controllers and application handlers.

use super::{DomainError, ErrorCode, ValidationError};

/// Failure of a controller or handler operation.
///
/// Store failures keep the backend's message verbatim so the caller can
/// show it as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Store or identity backend not initialized.
    BackendUnavailable(String),
    /// The store rejected a write.
    WriteFailed(String),
    /// The store rejected a read.
    ReadFailed(String),
    /// A local precondition failed.
    ValidationFailed { field: String, message: String },
    /// Expected document or sub-resource is absent.
    NotFound(String),
    /// Caller lacks the admin role.
    Forbidden,
}

impl ServiceError {
    pub fn backend_unavailable(message: impl Into<String>) -> Self {
        ServiceError::BackendUnavailable(message.into())
    }
    pub fn write_failed(message: impl Into<String>) -> Self {
        ServiceError::WriteFailed(message.into())
    }
    pub fn read_failed(message: impl Into<String>) -> Self {
        ServiceError::ReadFailed(message.into())
    }
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }
    pub fn forbidden() -> Self {
        ServiceError::Forbidden
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::BackendUnavailable(_) => ErrorCode::BackendUnavailable,
            ServiceError::WriteFailed(_) => ErrorCode::WriteRejected,
            ServiceError::ReadFailed(_) => ErrorCode::ReadFailed,
            ServiceError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            ServiceError::NotFound(_) => ErrorCode::UserNotFound,
            ServiceError::Forbidden => ErrorCode::Forbidden,
        }
    }

    /// Message suitable for showing to the user.
    pub fn message(&self) -> String {
        match self {
            ServiceError::BackendUnavailable(msg) => format!("Backend unavailable: {}", msg),
            ServiceError::WriteFailed(msg) | ServiceError::ReadFailed(msg) => msg.clone(),
            ServiceError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            ServiceError::NotFound(msg) => msg.clone(),
            ServiceError::Forbidden => "Permission denied".to_string(),
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ServiceError {}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::BackendUnavailable => ServiceError::BackendUnavailable(err.message),
            ErrorCode::WriteRejected => ServiceError::WriteFailed(err.message),
            ErrorCode::ReadFailed => ServiceError::ReadFailed(err.message),
            ErrorCode::UserNotFound
            | ErrorCode::MeasurementNotFound
            | ErrorCode::WeighingResultNotFound => ServiceError::NotFound(err.message),
            ErrorCode::Forbidden => ServiceError::Forbidden,
            ErrorCode::ValidationFailed | ErrorCode::InvalidStateTransition => {
                let field = err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string());
                ServiceError::ValidationFailed {
                    field,
                    message: err.message,
                }
            }
            ErrorCode::InternalError => ServiceError::WriteFailed(err.message),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}
