//! Compute provider error types

use thiserror::Error;

/// Errors raised while provisioning, polling, resolving or deleting instances
#[derive(Error, Debug)]
pub enum CloudError {
    /// The creation request was rejected before an operation was started
    #[error("Provision request for '{instance}' rejected: {message}")]
    ProvisionRequest { instance: String, message: String },

    /// The operation reached DONE with a provider-reported error payload
    #[error("Operation '{operation}' failed: {payload}")]
    OperationFailed {
        operation: String,
        payload: serde_json::Value,
    },

    /// No usable address could be read for the instance
    #[error("Address not found for '{instance}': {reason}")]
    AddressNotFound { instance: String, reason: String },

    #[error("Operation '{operation}' did not finish within {waited_secs}s")]
    OperationTimeout { operation: String, waited_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Whether the provider answered 404 for the addressed resource
    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::ApiError { status: 404, .. })
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
