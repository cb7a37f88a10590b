use colored::Colorize;
use nodefleet_core::{ProvisionConfig, load_fleet, write_inventory};
use std::path::PathBuf;

/// Re-render the inventory from a fleet file; no cloud access
pub async fn handle(config: &ProvisionConfig, from: Option<PathBuf>) -> anyhow::Result<()> {
    config.inventory.validate()?;

    let from = from.unwrap_or_else(|| config.inventory.fleet_file());
    let fleet = load_fleet(&from).await?;
    tracing::debug!("Loaded {} record(s) from {}", fleet.len(), from.display());

    let path = write_inventory(&fleet, &config.inventory).await?;
    println!(
        "{}",
        format!(
            "✓ Inventory for {} host(s) written to {}",
            fleet.len(),
            path.display()
        )
        .green()
    );

    Ok(())
}
