//! nodefleet core
//!
//! Configuration, the fleet orchestrator and the inventory writer. The
//! orchestrator only talks to a [`nodefleet_cloud::ComputeApi`], so any
//! provider (or a test double) can drive it.

pub mod config;
pub mod error;
pub mod fleet;
pub mod inventory;
pub mod orchestrator;

pub use config::{
    ConfigOverrides, InventoryConfig, ProvisionConfig, current_user, find_config_file,
};
pub use error::{AbortedRun, FleetError, Result};
pub use fleet::{Fleet, FleetRecord, Role};
pub use inventory::{load_fleet, render_inventory, save_fleet, write_inventory};
pub use orchestrator::{FleetOrchestrator, Progress};
