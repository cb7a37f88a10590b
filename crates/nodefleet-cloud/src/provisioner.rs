//! Instance provisioner

use crate::error::{CloudError, Result};
use crate::model::{InstanceSpec, OperationHandle};
use crate::provider::ComputeApi;

/// Submit a creation request for `spec` without waiting for it
///
/// Any synchronous rejection (bad template, quota, auth) comes back as
/// [`CloudError::ProvisionRequest`]. Nothing is retried.
pub async fn provision_instance(
    api: &dyn ComputeApi,
    spec: &InstanceSpec,
) -> Result<OperationHandle> {
    tracing::info!(
        "Requesting instance {} ({}, {}) in {}",
        spec.name,
        spec.profile.machine_type,
        spec.profile.image.family,
        spec.zone
    );

    match api.insert_instance(spec).await {
        Ok(handle) => {
            tracing::debug!("Instance {} accepted as operation {}", spec.name, handle);
            Ok(handle)
        }
        Err(e @ CloudError::ProvisionRequest { .. }) => Err(e),
        Err(e) => Err(CloudError::ProvisionRequest {
            instance: spec.name.clone(),
            message: e.to_string(),
        }),
    }
}
