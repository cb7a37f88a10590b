//! Compute provider trait definition

use crate::error::Result;
use crate::model::{Instance, InstanceSpec, Operation, OperationHandle};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Compute provider abstraction trait
///
/// Every call is a thin request against the provider; none of them wait for
/// the asynchronous work they start. Waiting is done by [`crate::waiter`].
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Returns the provider name (e.g., "gce")
    fn name(&self) -> &str;

    /// Submit a creation request and return the pending operation
    async fn insert_instance(&self, spec: &InstanceSpec) -> Result<OperationHandle>;

    /// Fetch the current state of an operation
    async fn get_operation(&self, handle: &OperationHandle) -> Result<Operation>;

    /// List instances in `zone` matching a provider filter expression
    async fn list_instances(&self, zone: &str, filter: &str) -> Result<Vec<Instance>>;

    /// Submit a deletion request and return the pending operation
    async fn delete_instance(&self, zone: &str, name: &str) -> Result<OperationHandle>;
}

/// Polling policy for [`crate::waiter::wait_for_operation`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitConfig {
    /// Delay before the second poll (milliseconds)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Growth factor applied per attempt; 1.0 keeps the interval fixed
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Upper bound on the delay between polls (milliseconds)
    #[serde(default = "default_max_interval")]
    pub max_interval_ms: u64,

    /// Give up after this many seconds; `None` or `0` polls forever
    #[serde(default = "default_timeout")]
    pub timeout_secs: Option<u64>,
}

fn default_poll_interval() -> u64 {
    1000
}
fn default_multiplier() -> f64 {
    1.0
}
fn default_max_interval() -> u64 {
    30000
}
fn default_timeout() -> Option<u64> {
    Some(600)
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            multiplier: default_multiplier(),
            max_interval_ms: default_max_interval(),
            timeout_secs: default_timeout(),
        }
    }
}

impl WaitConfig {
    /// Delay to sleep after the given zero-based attempt
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(attempt as i32);
        let delay = (self.poll_interval_ms as f64 * factor) as u64;
        Duration::from_millis(delay.min(self.max_interval_ms.max(self.poll_interval_ms)))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
