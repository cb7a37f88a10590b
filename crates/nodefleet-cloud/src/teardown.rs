//! Instance teardown
//!
//! Deletes instances one by one and keeps going past failures.

use crate::error::Result;
use crate::provider::{ComputeApi, WaitConfig};
use crate::waiter::wait_for_operation;
use serde::{Deserialize, Serialize};

/// Result of deleting a set of instances
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeardownResult {
    /// Instances confirmed gone
    pub succeeded: Vec<String>,

    /// Instances that could not be deleted, with the reason
    pub failed: Vec<TeardownFailure>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeardownFailure {
    pub instance: String,
    pub error: String,
}

impl TeardownResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_success(&mut self, instance: impl Into<String>) {
        self.succeeded.push(instance.into());
    }

    pub fn add_failure(&mut self, instance: impl Into<String>, error: impl Into<String>) {
        self.failed.push(TeardownFailure {
            instance: instance.into(),
            error: error.into(),
        });
    }
}

impl std::fmt::Display for TeardownResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} deleted, {} failed",
            self.succeeded.len(),
            self.failed.len()
        )
    }
}

/// Delete one instance and wait for the deletion to finish
///
/// A 404 on the delete request means the instance is already gone.
pub async fn delete_instance(
    api: &dyn ComputeApi,
    zone: &str,
    name: &str,
    wait: &WaitConfig,
) -> Result<()> {
    tracing::info!("Deleting instance {} in {}", name, zone);

    let handle = match api.delete_instance(zone, name).await {
        Ok(handle) => handle,
        Err(e) if e.is_not_found() => {
            tracing::debug!("Instance {} already absent", name);
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    wait_for_operation(api, &handle, wait).await?;
    Ok(())
}

/// Delete every named instance, in order, recording each outcome
pub async fn delete_instances(
    api: &dyn ComputeApi,
    zone: &str,
    names: &[String],
    wait: &WaitConfig,
) -> TeardownResult {
    let mut result = TeardownResult::new();
    let start = std::time::Instant::now();

    for name in names {
        match delete_instance(api, zone, name, wait).await {
            Ok(()) => result.add_success(name.clone()),
            Err(e) => {
                tracing::warn!("Failed to delete {}: {}", name, e);
                result.add_failure(name.clone(), e.to_string());
            }
        }
    }

    result.duration_ms = start.elapsed().as_millis() as u64;
    result
}
