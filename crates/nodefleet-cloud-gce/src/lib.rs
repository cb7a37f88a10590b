//! Google Compute Engine provider for nodefleet
//!
//! This crate implements the ComputeApi trait against the Compute Engine v1
//! REST API.
//!
//! # Requirements
//!
//! - An access token in configuration, or the `gcloud` CLI installed and
//!   logged in (optionally with a service account key file)
//!
//! # Example
//!
//! ```ignore
//! use nodefleet_cloud_gce::{GceConfig, GceProvider, TokenSource};
//!
//! let provider = GceProvider::connect(GceConfig {
//!     project: "my-project".to_string(),
//!     token_source: TokenSource::Gcloud { credentials_file: None },
//!     base_url: None,
//! })
//! .await?;
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod provider;

pub use auth::{Gcloud, TokenSource};
pub use client::{ComputeClient, Image, InstanceResource, api_error_message, expand_scope};
pub use error::{GceError, Result};
pub use provider::{GceConfig, GceProvider};
