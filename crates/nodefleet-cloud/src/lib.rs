//! nodefleet compute abstraction
//!
//! This crate defines the seam between nodefleet and a compute provider,
//! plus the provisioning steps that only talk to that seam.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │               nodefleet-core                     │
//! │            (fleet orchestrator)                  │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               nodefleet-cloud                    │
//! │  provision_instance → wait_for_operation         │
//! │                     → resolve_address            │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │          trait ComputeApi { ... }         │   │
//! │  └──────────────────────────────────────────┘   │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │      gce      │
//!           │   provider    │
//!           └───────────────┘
//! ```

pub mod error;
pub mod model;
pub mod provider;
pub mod provisioner;
pub mod resolver;
pub mod teardown;
pub mod waiter;

#[cfg(test)]
mod mock;

// Re-exports
pub use error::{CloudError, Result};
pub use model::{
    AccessConfig, ImageRef, Instance, InstanceSpec, MachineProfile, NetworkInterface,
    NetworkMode, Operation, OperationHandle, OperationStatus,
};
pub use provider::{ComputeApi, WaitConfig};
pub use provisioner::provision_instance;
pub use resolver::{AddressKind, address_of, resolve_address};
pub use teardown::{TeardownFailure, TeardownResult, delete_instance, delete_instances};
pub use waiter::wait_for_operation;
