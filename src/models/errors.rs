use thiserror::Error;

/// Request-level errors surfaced to HTTP clients.
///
/// Storage failures never reach this type: menu reads fall back to sample
/// data and inquiries are acknowledged regardless.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

/// Repository-level errors for document store operations
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database connection failed")]
    ConnectionFailed,

    #[error("DynamoDB table not found: {table_name}. Ensure the table exists and IAM permissions are correct.")]
    TableNotFound { table_name: String },

    #[error("Conditional check failed")]
    ConditionalCheckFailed,

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("Invalid document: {message}")]
    InvalidDocument { message: String },

    #[error("AWS SDK error: {message}")]
    AwsSdk { message: String },

    #[error("Timeout occurred during operation")]
    Timeout,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl RepositoryError {
    /// True for errors that mean the store could not be reached or used at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            RepositoryError::ConnectionFailed
                | RepositoryError::TableNotFound { .. }
                | RepositoryError::AwsSdk { .. }
                | RepositoryError::Timeout
                | RepositoryError::RateLimitExceeded
        )
    }

    /// Stable label used in logs and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            RepositoryError::ConnectionFailed => "connection_failed",
            RepositoryError::TableNotFound { .. } => "table_not_found",
            RepositoryError::ConditionalCheckFailed => "conditional_check_failed",
            RepositoryError::Serialization { .. } => "serialization",
            RepositoryError::InvalidDocument { .. } => "invalid_document",
            RepositoryError::AwsSdk { .. } => "aws_sdk",
            RepositoryError::Timeout => "timeout",
            RepositoryError::RateLimitExceeded => "rate_limit_exceeded",
        }
    }
}

/// Validation errors for input data
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredField { field: String },

    #[error("Invalid field value: {field}={value}, reason={reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Field too long: {field}, max_length={max_length}, actual_length={actual_length}")]
    TooLong {
        field: String,
        max_length: usize,
        actual_length: usize,
    },
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::ValidationError {
            message: err.to_string(),
        }
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Result type alias for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;
