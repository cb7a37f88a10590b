//! Address resolver
//!
//! Reads the address of a freshly created instance. The lookup trusts the
//! first list result, the first interface and the first access config; it
//! does not search for alternatives.

use crate::error::{CloudError, Result};
use crate::model::{Instance, NetworkMode};
use crate::provider::ComputeApi;

/// Which address of the instance to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    /// `natIP` of the first access config
    External,
    /// `networkIP` of the first interface
    Internal,
}

impl From<NetworkMode> for AddressKind {
    fn from(mode: NetworkMode) -> Self {
        match mode {
            NetworkMode::Public => AddressKind::External,
            NetworkMode::Private => AddressKind::Internal,
        }
    }
}

/// Look up `name` in `zone` and return its address
///
/// The instance's creation operation must already be DONE.
pub async fn resolve_address(
    api: &dyn ComputeApi,
    zone: &str,
    name: &str,
    kind: AddressKind,
) -> Result<String> {
    let filter = format!("name={}", name);
    let instances = api.list_instances(zone, &filter).await?;

    let instance = instances
        .first()
        .ok_or_else(|| CloudError::AddressNotFound {
            instance: name.to_string(),
            reason: "no instance matched the lookup".to_string(),
        })?;

    let address = address_of(instance, kind).map_err(|reason| CloudError::AddressNotFound {
        instance: name.to_string(),
        reason,
    })?;

    tracing::debug!("Instance {} has address {}", name, address);
    Ok(address)
}

/// Extract the address from a described instance
pub fn address_of(instance: &Instance, kind: AddressKind) -> std::result::Result<String, String> {
    let nic = instance
        .network_interfaces
        .first()
        .ok_or_else(|| "instance has no network interface".to_string())?;

    let address = match kind {
        AddressKind::External => nic
            .access_configs
            .first()
            .ok_or_else(|| "first interface has no external access config".to_string())?
            .nat_ip
            .clone(),
        AddressKind::Internal => nic.network_ip.clone(),
    };

    address
        .filter(|a| !a.is_empty())
        .ok_or_else(|| "no address has been assigned yet".to_string())
}
