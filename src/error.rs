//! Unified error system with HTTP status mapping, user-facing messages
//! and structured error codes for client handling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    // Domain errors (4xx)
    #[serde(rename = "TRANSACTION_NOT_FOUND")]
    TransactionNotFound,
    #[serde(rename = "MEMBER_NOT_FOUND")]
    MemberNotFound,
    #[serde(rename = "INVALID_AMOUNT")]
    InvalidAmount,

    // Infrastructure errors (5xx)
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError,
    #[serde(rename = "CONFIGURATION_ERROR")]
    ConfigurationError,

    // External errors (4xx per gateway contract, 502, 504)
    #[serde(rename = "GATEWAY_DECLINED")]
    GatewayDeclined,
    #[serde(rename = "INVALID_SIGNATURE")]
    InvalidSignature,
    #[serde(rename = "GATEWAY_ERROR")]
    GatewayError,
    #[serde(rename = "DIRECTORY_ERROR")]
    DirectoryError,
    #[serde(rename = "EXTERNAL_SERVICE_TIMEOUT")]
    ExternalServiceTimeout,

    // Generic
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
    #[serde(rename = "VALIDATION_ERROR")]
    ValidationError,
}

/// Domain-specific business logic errors
#[derive(Debug, Clone)]
pub enum DomainError {
    /// No transaction matches the given invoice number
    TransactionNotFound { invoice_no: String },
    /// Member directory lookup returned nothing
    MemberNotFound { query: String },
    /// Amount is invalid (negative, non-numeric, not finite)
    InvalidAmount { amount: String, reason: String },
}

/// Infrastructure-level errors (database, configuration)
#[derive(Debug, Clone)]
pub enum InfrastructureError {
    /// Database connection or query failure
    Database { message: String, is_retryable: bool },
    /// Missing or invalid configuration
    Configuration { message: String },
}

/// External service errors (card gateway, membership directory)
#[derive(Debug, Clone)]
pub enum ExternalError {
    /// Gateway answered with a non-success response code
    GatewayDeclined { resp_code: String, resp_desc: String },
    /// Envelope signature did not verify
    InvalidSignature { message: String },
    /// Gateway unreachable or returned a malformed envelope
    Gateway { message: String, is_retryable: bool },
    /// Membership directory unreachable or returned a malformed body
    Directory { message: String },
    /// External service timeout
    Timeout { service: String, timeout_secs: u64 },
}

/// Input validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// Required field missing
    MissingField { field: String },
    /// Field present but unusable
    InvalidField { field: String, reason: String },
    /// Invalid amount (format or value)
    InvalidAmount { amount: String, reason: String },
}

/// Unified application error type
#[derive(Debug, Clone)]
pub struct AppError {
    pub kind: AppErrorKind,
    pub request_id: Option<String>,
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub enum AppErrorKind {
    Domain(DomainError),
    Infrastructure(InfrastructureError),
    External(ExternalError),
    Validation(ValidationError),
}

impl AppError {
    pub fn new(kind: AppErrorKind) -> Self {
        Self {
            kind,
            request_id: None,
            context: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Validation(ValidationError::MissingField {
            field: field.into(),
        }))
    }

    /// Map error to HTTP status code
    pub fn status_code(&self) -> u16 {
        match &self.kind {
            AppErrorKind::Domain(err) => match err {
                DomainError::TransactionNotFound { .. } => 404,
                DomainError::MemberNotFound { .. } => 404,
                DomainError::InvalidAmount { .. } => 400,
            },
            AppErrorKind::Infrastructure(err) => match err {
                InfrastructureError::Database { .. } => 500,
                InfrastructureError::Configuration { .. } => 500,
            },
            AppErrorKind::External(err) => match err {
                // Gateway-explained failures surface to the caller as 400
                ExternalError::GatewayDeclined { .. } => 400,
                ExternalError::InvalidSignature { .. } => 400,
                ExternalError::Gateway { .. } => 502,
                ExternalError::Directory { .. } => 502,
                ExternalError::Timeout { .. } => 504,
            },
            AppErrorKind::Validation(_) => 400,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> ErrorCode {
        match &self.kind {
            AppErrorKind::Domain(err) => match err {
                DomainError::TransactionNotFound { .. } => ErrorCode::TransactionNotFound,
                DomainError::MemberNotFound { .. } => ErrorCode::MemberNotFound,
                DomainError::InvalidAmount { .. } => ErrorCode::InvalidAmount,
            },
            AppErrorKind::Infrastructure(err) => match err {
                InfrastructureError::Database { .. } => ErrorCode::DatabaseError,
                InfrastructureError::Configuration { .. } => ErrorCode::ConfigurationError,
            },
            AppErrorKind::External(err) => match err {
                ExternalError::GatewayDeclined { .. } => ErrorCode::GatewayDeclined,
                ExternalError::InvalidSignature { .. } => ErrorCode::InvalidSignature,
                ExternalError::Gateway { .. } => ErrorCode::GatewayError,
                ExternalError::Directory { .. } => ErrorCode::DirectoryError,
                ExternalError::Timeout { .. } => ErrorCode::ExternalServiceTimeout,
            },
            AppErrorKind::Validation(_) => ErrorCode::ValidationError,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match &self.kind {
            AppErrorKind::Domain(err) => match err {
                DomainError::TransactionNotFound { invoice_no } => {
                    format!("No transaction found for invoice '{}'", invoice_no)
                }
                DomainError::MemberNotFound { query } => {
                    format!("No member found for '{}'", query)
                }
                DomainError::InvalidAmount { amount, reason } => {
                    format!("Invalid amount '{}': {}", amount, reason)
                }
            },
            AppErrorKind::Infrastructure(_) => {
                "Service temporarily unavailable. Please try again later".to_string()
            }
            AppErrorKind::External(err) => match err {
                ExternalError::GatewayDeclined {
                    resp_code,
                    resp_desc,
                } => {
                    format!("Payment gateway declined the request ({}): {}", resp_code, resp_desc)
                }
                ExternalError::InvalidSignature { .. } => {
                    "Invalid payload signature".to_string()
                }
                ExternalError::Gateway { is_retryable, .. } => {
                    if *is_retryable {
                        "Payment gateway is temporarily unavailable. Please try again".to_string()
                    } else {
                        "Payment gateway returned an unusable response".to_string()
                    }
                }
                ExternalError::Directory { .. } => {
                    "Membership directory is unavailable".to_string()
                }
                ExternalError::Timeout {
                    service,
                    timeout_secs,
                } => {
                    format!(
                        "{} request timed out after {} seconds. Please try again",
                        service, timeout_secs
                    )
                }
            },
            AppErrorKind::Validation(err) => match err {
                ValidationError::MissingField { field } => {
                    format!("Missing required field: {}", field)
                }
                ValidationError::InvalidField { field, reason } => {
                    format!("Invalid field '{}': {}", field, reason)
                }
                ValidationError::InvalidAmount { amount, reason } => {
                    format!("Invalid amount '{}': {}", amount, reason)
                }
            },
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match &self.kind {
            AppErrorKind::Domain(_) => false,
            AppErrorKind::Infrastructure(err) => match err {
                InfrastructureError::Database { is_retryable, .. } => *is_retryable,
                InfrastructureError::Configuration { .. } => false,
            },
            AppErrorKind::External(err) => match err {
                ExternalError::GatewayDeclined { .. } => false,
                ExternalError::InvalidSignature { .. } => false,
                ExternalError::Gateway { is_retryable, .. } => *is_retryable,
                ExternalError::Directory { .. } => true,
                ExternalError::Timeout { .. } => true,
            },
            AppErrorKind::Validation(_) => false,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for AppError {}

// Conversions from module error types live next to those types
// (database/error.rs, gateway/error.rs, directory/error.rs).

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::new(AppErrorKind::Infrastructure(
            InfrastructureError::Configuration {
                message: err.to_string(),
            },
        ))
    }
}

/// Result type for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;
