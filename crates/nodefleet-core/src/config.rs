//! Provisioning configuration
//!
//! Values are layered, lowest precedence first:
//! 1. built-in defaults
//! 2. a TOML file (see [`find_config_file`])
//! 3. `NODEFLEET_*` environment variables, nested keys split by `__`
//! 4. command line overrides ([`ConfigOverrides`])

use crate::error::{FleetError, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use nodefleet_cloud::{ImageRef, MachineProfile, NetworkMode, WaitConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "NODEFLEET_";
pub const CONFIG_PATH_ENV: &str = "NODEFLEET_CONFIG_PATH";

const CONFIG_CANDIDATES: [&str; 2] = ["nodefleet.local.toml", "nodefleet.toml"];

/// Largest fleet one run may request
pub const MAX_NODES: usize = 1000;

/// Everything one provisioning run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Cloud project identifier (required)
    pub project: String,

    pub zone: String,

    /// Fleet size
    pub nodes: usize,

    /// Instances are named `<name_prefix>-<index>`
    pub name_prefix: String,

    pub machine_type: String,

    pub image_project: String,

    pub image_family: String,

    pub network: String,

    pub network_mode: NetworkMode,

    pub service_account: String,

    /// Full scope URLs or short names such as `logging.write`
    pub scopes: Vec<String>,

    /// Service account key file handed to gcloud
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_file: Option<PathBuf>,

    /// Bearer token; skips gcloud when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Compute API endpoint override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,

    /// Delete already created instances when a run aborts
    pub cleanup_on_failure: bool,

    pub wait: WaitConfig,

    pub inventory: InventoryConfig,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            zone: "us-east1-b".to_string(),
            nodes: 4,
            name_prefix: "node".to_string(),
            machine_type: "n1-standard-2".to_string(),
            image_project: "ubuntu-os-cloud".to_string(),
            image_family: "ubuntu-1604-lts".to_string(),
            network: "global/networks/default".to_string(),
            network_mode: NetworkMode::Public,
            service_account: "default".to_string(),
            scopes: vec![
                "https://www.googleapis.com/auth/devstorage.read_write".to_string(),
                "https://www.googleapis.com/auth/logging.write".to_string(),
            ],
            credentials_file: None,
            access_token: None,
            api_endpoint: None,
            cleanup_on_failure: false,
            wait: WaitConfig::default(),
            inventory: InventoryConfig::default(),
        }
    }
}

/// Inventory output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub path: PathBuf,

    /// Login user written for every host
    pub user: String,

    pub primary_group: String,

    /// Host alias of the primary entry
    pub primary_alias: String,

    pub secondary_group: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("hosts"),
            user: current_user(),
            primary_group: "masters".to_string(),
            primary_alias: "master".to_string(),
            secondary_group: "workers".to_string(),
        }
    }
}

impl InventoryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.user.trim().is_empty() {
            return Err(FleetError::InvalidConfig(
                "inventory user is unknown (set inventory.user or --user)".to_string(),
            ));
        }
        if self.primary_group.trim().is_empty() || self.secondary_group.trim().is_empty() {
            return Err(FleetError::InvalidConfig(
                "inventory group names must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// JSON copy of the fleet, stored next to the inventory
    pub fn fleet_file(&self) -> PathBuf {
        self.path.with_file_name("fleet.json")
    }
}

/// Login name of the invoking user
pub fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default()
}

/// Command line values that win over every other layer
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub project: Option<String>,
    pub zone: Option<String>,
    pub nodes: Option<usize>,
    pub inventory_path: Option<PathBuf>,
    pub user: Option<String>,
    pub cleanup_on_failure: bool,
}

impl ProvisionConfig {
    /// Load defaults, file, environment and overrides
    ///
    /// `explicit` must exist when given; otherwise discovery is used and a
    /// missing file is fine. The result is not validated; commands that talk
    /// to the provider call [`ProvisionConfig::validate`].
    pub fn load(explicit: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(ProvisionConfig::default()));

        let file = match explicit {
            Some(path) if path.exists() => Some(path.to_path_buf()),
            Some(path) => return Err(FleetError::ConfigNotFound(path.to_path_buf())),
            None => find_config_file()?,
        };

        if let Some(path) = &file {
            tracing::debug!("Loading configuration from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        let config: ProvisionConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config.with_overrides(overrides))
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(project) = overrides.project {
            self.project = project;
        }
        if let Some(zone) = overrides.zone {
            self.zone = zone;
        }
        if let Some(nodes) = overrides.nodes {
            self.nodes = nodes;
        }
        if let Some(path) = overrides.inventory_path {
            self.inventory.path = path;
        }
        if let Some(user) = overrides.user {
            self.inventory.user = user;
        }
        if overrides.cleanup_on_failure {
            self.cleanup_on_failure = true;
        }
        self
    }

    /// Full check for a provisioning run: target plus inventory settings
    pub fn validate(&self) -> Result<()> {
        self.validate_target()?;
        self.inventory.validate()
    }

    /// Check only what is needed to address instances at the provider
    pub fn validate_target(&self) -> Result<()> {
        if self.project.trim().is_empty() {
            return Err(FleetError::InvalidConfig(
                "project is not set (use --project, NODEFLEET_PROJECT or nodefleet.toml)"
                    .to_string(),
            ));
        }
        if self.zone.trim().is_empty() {
            return Err(FleetError::InvalidConfig("zone is empty".to_string()));
        }
        if self.nodes == 0 {
            return Err(FleetError::InvalidConfig(
                "nodes must be at least 1".to_string(),
            ));
        }
        if self.nodes > MAX_NODES {
            return Err(FleetError::InvalidConfig(format!(
                "nodes must be at most {} (got {})",
                MAX_NODES, self.nodes
            )));
        }
        if self.name_prefix.trim().is_empty() {
            return Err(FleetError::InvalidConfig("name_prefix is empty".to_string()));
        }
        Ok(())
    }

    /// Instance names in provisioning order
    pub fn instance_names(&self) -> Vec<String> {
        (0..self.nodes)
            .map(|i| format!("{}-{}", self.name_prefix, i))
            .collect()
    }

    /// Machine template shared by every instance of the fleet
    pub fn machine_profile(&self) -> MachineProfile {
        MachineProfile {
            machine_type: self.machine_type.clone(),
            image: ImageRef {
                project: self.image_project.clone(),
                family: self.image_family.clone(),
            },
            network: self.network.clone(),
            network_mode: self.network_mode,
            service_account: self.service_account.clone(),
            scopes: self.scopes.clone(),
            disk_auto_delete: true,
        }
    }
}

/// Locate the configuration file
///
/// Search order:
/// 1. `NODEFLEET_CONFIG_PATH` (direct path)
/// 2. current directory: nodefleet.local.toml, nodefleet.toml
/// 3. ~/.config/nodefleet/nodefleet.toml
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        tracing::warn!(
            "{} points to missing file {}, continuing discovery",
            CONFIG_PATH_ENV,
            path.display()
        );
    }

    let current_dir = std::env::current_dir().map_err(|e| FleetError::IoError {
        path: PathBuf::from("."),
        message: e.to_string(),
    })?;

    for filename in &CONFIG_CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("nodefleet").join("nodefleet.toml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}
