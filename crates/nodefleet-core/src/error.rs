use crate::fleet::Fleet;
use nodefleet_cloud::{CloudError, TeardownResult};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FleetError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load configuration: {0}")]
    Config(String),

    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error("Provisioning aborted at '{}': {}", .0.failed_instance, .0.error)]
    Aborted(Box<AbortedRun>),

    #[error("Cannot write an inventory for an empty fleet")]
    EmptyFleet,

    #[error("IO error: {path}\nreason: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for FleetError {
    fn from(err: figment::Error) -> Self {
        FleetError::Config(err.to_string())
    }
}

/// State left behind by a run that stopped early
///
/// Every name in `created` had its creation request accepted and may still
/// exist (and bill) unless `cleanup` shows it was deleted.
#[derive(Debug)]
pub struct AbortedRun {
    /// Records completed before the failure, in provisioning order
    pub fleet: Fleet,

    /// Instances whose creation was accepted, in request order
    pub created: Vec<String>,

    pub failed_instance: String,

    pub error: CloudError,

    /// Outcome of best-effort deletion, when it was requested
    pub cleanup: Option<TeardownResult>,
}

impl AbortedRun {
    /// Instances the operator still has to delete by hand
    pub fn leftover(&self) -> Vec<String> {
        match &self.cleanup {
            Some(cleanup) => cleanup.failed.iter().map(|f| f.instance.clone()).collect(),
            None => self.created.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FleetError>;
