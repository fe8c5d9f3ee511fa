use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Gateway declined request: {resp_code} {resp_desc}")]
    Declined { resp_code: String, resp_desc: String },

    #[error("Invalid envelope signature: {message}")]
    InvalidSignature { message: String },

    #[error("Malformed gateway envelope: {message}")]
    InvalidEnvelope { message: String },

    #[error("Network error: {message}")]
    Network { message: String },
}

impl GatewayError {
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Validation { .. } => false,
            GatewayError::Declined { .. } => false,
            GatewayError::InvalidSignature { .. } => false,
            GatewayError::InvalidEnvelope { .. } => false,
            GatewayError::Network { .. } => true,
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            GatewayError::Validation { .. } => 400,
            // Gateway-explained failures surface to the caller per contract
            GatewayError::Declined { .. } => 400,
            GatewayError::InvalidSignature { .. } => 400,
            GatewayError::InvalidEnvelope { .. } => 502,
            GatewayError::Network { .. } => 502,
        }
    }
}

impl From<GatewayError> for crate::error::AppError {
    fn from(err: GatewayError) -> Self {
        use crate::error::{AppError, AppErrorKind, ExternalError, ValidationError};

        let kind = match err {
            GatewayError::Validation { message, field } => {
                AppErrorKind::Validation(ValidationError::InvalidField {
                    field: field.unwrap_or_else(|| "request".to_string()),
                    reason: message,
                })
            }
            GatewayError::Declined {
                resp_code,
                resp_desc,
            } => AppErrorKind::External(ExternalError::GatewayDeclined {
                resp_code,
                resp_desc,
            }),
            GatewayError::InvalidSignature { message } => {
                AppErrorKind::External(ExternalError::InvalidSignature { message })
            }
            GatewayError::InvalidEnvelope { message } => {
                AppErrorKind::External(ExternalError::Gateway {
                    message,
                    is_retryable: false,
                })
            }
            GatewayError::Network { message } => AppErrorKind::External(ExternalError::Gateway {
                message,
                is_retryable: true,
            }),
        };

        AppError::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_http_status_mapping_is_correct() {
        assert_eq!(
            GatewayError::Declined {
                resp_code: "9015".to_string(),
                resp_desc: "Invalid merchant".to_string(),
            }
            .http_status_code(),
            400
        );
        assert_eq!(
            GatewayError::Network {
                message: "timeout".to_string()
            }
            .http_status_code(),
            502
        );
    }

    #[test]
    fn retryable_flags_are_set() {
        assert!(GatewayError::Network {
            message: "timeout".to_string()
        }
        .is_retryable());
        assert!(!GatewayError::InvalidSignature {
            message: "bad signature".to_string()
        }
        .is_retryable());
    }
}
