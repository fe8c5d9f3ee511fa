use thiserror::Error;

pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Invalid directory response: {message}")]
    InvalidResponse { message: String },
}

impl From<DirectoryError> for crate::error::AppError {
    fn from(err: DirectoryError) -> Self {
        use crate::error::{AppError, AppErrorKind, ExternalError, ValidationError};

        let kind = match err {
            DirectoryError::Validation { message } => {
                AppErrorKind::Validation(ValidationError::InvalidField {
                    field: "query".to_string(),
                    reason: message,
                })
            }
            DirectoryError::Timeout { seconds } => AppErrorKind::External(ExternalError::Timeout {
                service: "directory".to_string(),
                timeout_secs: seconds,
            }),
            DirectoryError::Network { message }
            | DirectoryError::InvalidResponse { message } => {
                AppErrorKind::External(ExternalError::Directory { message })
            }
        };

        AppError::new(kind)
    }
}
