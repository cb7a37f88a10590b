//! Data model shared by every compute provider

use serde::{Deserialize, Serialize};

/// Boot image reference, resolved to the newest image of `family`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Project that publishes the image family (e.g. "ubuntu-os-cloud")
    pub project: String,

    /// Image family name (e.g. "ubuntu-1604-lts")
    pub family: String,
}

/// How an instance is reachable from outside its network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkMode {
    /// One-to-one NAT with an ephemeral external address
    #[default]
    Public,
    /// Internal address only
    Private,
}

impl std::fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkMode::Public => write!(f, "public"),
            NetworkMode::Private => write!(f, "private"),
        }
    }
}

/// Fixed machine template applied to every instance of a fleet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineProfile {
    /// Machine type name (e.g. "n1-standard-2")
    pub machine_type: String,

    /// Boot disk image
    pub image: ImageRef,

    /// Network the first interface attaches to
    pub network: String,

    pub network_mode: NetworkMode,

    /// Service account email ("default" for the project default)
    pub service_account: String,

    /// OAuth scopes granted to the service account
    pub scopes: Vec<String>,

    /// Delete the boot disk together with the instance
    pub disk_auto_delete: bool,
}

/// Everything needed to request one instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSpec {
    pub name: String,
    pub zone: String,
    pub profile: MachineProfile,
}

impl InstanceSpec {
    pub fn new(name: impl Into<String>, zone: impl Into<String>, profile: MachineProfile) -> Self {
        Self {
            name: name.into(),
            zone: zone.into(),
            profile,
        }
    }
}

/// Reference to an in-flight asynchronous operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationHandle {
    pub id: String,
    pub zone: String,
}

impl OperationHandle {
    pub fn new(id: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            zone: zone.into(),
        }
    }
}

impl std::fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.zone, self.id)
    }
}

/// Status of an operation as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Pending,
    Running,
    Done,
}

impl OperationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationStatus::Done)
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationStatus::Pending => write!(f, "PENDING"),
            OperationStatus::Running => write!(f, "RUNNING"),
            OperationStatus::Done => write!(f, "DONE"),
        }
    }
}

/// Polled view of an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,

    #[serde(default)]
    pub zone: String,

    pub status: OperationStatus,

    /// Provider error payload, present only on failed operations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,

    /// Resource the operation acts on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_link: Option<String>,
}

impl Operation {
    pub fn handle(&self) -> OperationHandle {
        OperationHandle::new(&self.name, &self.zone)
    }
}

/// Described view of an instance, reduced to what address lookup needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    /// Internal address
    #[serde(default, rename = "networkIP", skip_serializing_if = "Option::is_none")]
    pub network_ip: Option<String>,

    #[serde(default)]
    pub access_configs: Vec<AccessConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// External address, assigned once the instance has booted its network
    #[serde(default, rename = "natIP", skip_serializing_if = "Option::is_none")]
    pub nat_ip: Option<String>,
}
