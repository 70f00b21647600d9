use super::numeric::NumericError;
use super::providers::ProviderError;
use axum::http::StatusCode;
use thiserror::Error;

/// Message sent to clients for failures whose detail must stay server-side.
pub const GENERIC_ERROR_MESSAGE: &str = "Internal server error";

/// Every way a `/bfhl` request can fail.
#[derive(Debug, Error)]
pub enum OperationError {
    /// Malformed client input.
    #[error("{0}")]
    Validation(String),

    /// Numeric routine rejected its input.
    #[error(transparent)]
    Numeric(#[from] NumericError),

    /// No AI provider credential configured.
    #[error("AI service is not configured: {0}")]
    Configuration(String),

    /// The AI provider call failed.
    #[error("AI provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Anything else.
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl OperationError {
    pub fn validation(message: impl Into<String>) -> Self {
        OperationError::Validation(message.into())
    }

    /// Configuration and provider failures stay 400, matching the
    /// established response codes of this endpoint.
    pub fn status_code(&self) -> StatusCode {
        match self {
            OperationError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Text placed in the envelope's `error` field.
    pub fn client_message(&self) -> String {
        match self {
            OperationError::Unexpected(_) => GENERIC_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            OperationError::Validation(_) => "validation",
            OperationError::Numeric(NumericError::EmptyInput(_)) => "empty_input",
            OperationError::Numeric(NumericError::Overflow(_)) => "overflow",
            OperationError::Configuration(_) => "configuration",
            OperationError::Provider(_) => "provider",
            OperationError::Unexpected(_) => "unexpected",
        }
    }
}
