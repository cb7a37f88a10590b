//! Inventory writer
//!
//! Renders a fleet as a two-group host list:
//!
//! ```text
//! [masters]
//! master ansible_host=1.1.1.1 ansible_user=alice
//!
//! [workers]
//! node-1 ansible_host=1.1.1.2 ansible_user=alice
//! ```

use crate::config::InventoryConfig;
use crate::error::{FleetError, Result};
use crate::fleet::{Fleet, FleetRecord};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio::fs;

fn host_line(out: &mut String, alias: &str, record: &FleetRecord, user: &str) {
    let _ = writeln!(
        out,
        "{} ansible_host={} ansible_user={}",
        alias, record.address, user
    );
}

/// Render the inventory text; the same input always yields the same bytes
pub fn render_inventory(fleet: &Fleet, settings: &InventoryConfig) -> Result<String> {
    let primary = fleet.primary().ok_or(FleetError::EmptyFleet)?;
    let mut out = String::new();

    let _ = writeln!(out, "[{}]", settings.primary_group);
    host_line(&mut out, &settings.primary_alias, primary, &settings.user);
    out.push('\n');

    let _ = writeln!(out, "[{}]", settings.secondary_group);
    for record in fleet.secondaries() {
        host_line(&mut out, &record.name, record, &settings.user);
    }

    Ok(out)
}

async fn write_file(path: &Path, content: &str) -> Result<()> {
    let io_error = |e: std::io::Error| FleetError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    fs::write(path, content).await.map_err(io_error)
}

/// Write the inventory to `settings.path` and return that path
pub async fn write_inventory(fleet: &Fleet, settings: &InventoryConfig) -> Result<PathBuf> {
    let content = render_inventory(fleet, settings)?;
    write_file(&settings.path, &content).await?;
    tracing::info!(
        "Wrote inventory for {} host(s) to {}",
        fleet.len(),
        settings.path.display()
    );
    Ok(settings.path.clone())
}

/// Store the fleet as JSON so the inventory can be rebuilt later
pub async fn save_fleet(fleet: &Fleet, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(fleet)?;
    write_file(path, &content).await?;
    tracing::debug!("Saved fleet with {} records to {}", fleet.len(), path.display());
    Ok(())
}

pub async fn load_fleet(path: &Path) -> Result<Fleet> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| FleetError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(serde_json::from_str(&content)?)
}
