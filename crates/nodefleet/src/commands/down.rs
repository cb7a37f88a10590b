use colored::Colorize;
use nodefleet_core::{FleetOrchestrator, ProvisionConfig};

pub async fn handle(config: &ProvisionConfig, yes: bool) -> anyhow::Result<()> {
    // No inventory is written, so the login user is not required
    config.validate_target()?;

    let names = config.instance_names();
    println!(
        "{}",
        format!(
            "Instances to delete in {} ({}):",
            config.project, config.zone
        )
        .bold()
    );
    for name in &names {
        println!("  • {}", name.cyan());
    }

    if !yes {
        println!();
        println!(
            "{}",
            "⚠ This permanently deletes the instances and their boot disks."
                .red()
                .bold()
        );
        println!("  Re-run with --yes to proceed.");
        return Ok(());
    }

    let provider = super::connect(config).await?;
    let result = FleetOrchestrator::new(&provider, config).teardown().await;

    println!();
    for name in &result.succeeded {
        println!("  {} {}", "✓".green(), name);
    }
    for failure in &result.failed {
        println!("  {} {}: {}", "✗".red(), failure.instance, failure.error);
    }

    println!();
    if result.is_success() {
        println!("{}", format!("✓ {}", result).green().bold());
        Ok(())
    } else {
        anyhow::bail!("teardown incomplete: {}", result)
    }
}
