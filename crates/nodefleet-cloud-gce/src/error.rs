//! GCE provider error types

use nodefleet_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GceError {
    #[error("gcloud not found. Install the Google Cloud SDK or set NODEFLEET_ACCESS_TOKEN")]
    GcloudNotFound,

    #[error("gcloud authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("gcloud command failed: {0}")]
    CommandFailed(String),

    #[error("Compute API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<GceError> for CloudError {
    fn from(err: GceError) -> Self {
        match err {
            GceError::GcloudNotFound => {
                CloudError::AuthenticationFailed(GceError::GcloudNotFound.to_string())
            }
            GceError::AuthenticationFailed(msg) => CloudError::AuthenticationFailed(msg),
            GceError::CommandFailed(msg) => CloudError::CommandFailed(msg),
            GceError::Api { status, message } => CloudError::ApiError { status, message },
            GceError::Http(e) => CloudError::ApiError {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                message: e.to_string(),
            },
            GceError::JsonError(e) => CloudError::Json(e),
            GceError::IoError(e) => CloudError::Io(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, GceError>;
