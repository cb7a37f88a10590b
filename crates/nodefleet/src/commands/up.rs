use colored::Colorize;
use nodefleet_core::{
    AbortedRun, FleetError, FleetOrchestrator, Progress, ProvisionConfig, Role, save_fleet,
    write_inventory,
};
use std::path::Path;

pub async fn handle(config: &ProvisionConfig, config_path: Option<&Path>) -> anyhow::Result<()> {
    config.validate()?;

    println!(
        "{}",
        format!(
            "Provisioning {} instance(s) in {} ({})",
            config.nodes, config.project, config.zone
        )
        .green()
        .bold()
    );
    println!(
        "  machine: {}  image: {}/{}  network: {} ({})",
        config.machine_type.cyan(),
        config.image_project,
        config.image_family,
        config.network,
        config.network_mode
    );

    let provider = super::connect(config).await?;
    let orchestrator = FleetOrchestrator::new(&provider, config);

    let fleet = match orchestrator.run_with_progress(print_progress).await {
        Ok(fleet) => fleet,
        Err(FleetError::Aborted(aborted)) => {
            report_abort(&aborted, config, config_path);
            anyhow::bail!("provisioning aborted at '{}'", aborted.failed_instance);
        }
        Err(e) => return Err(e.into()),
    };

    println!();
    println!("{}", format!("Fleet ({} instances):", fleet.len()).bold());
    for (role, record) in fleet.iter_roles() {
        let role = match role {
            Role::Primary => "primary".magenta(),
            Role::Secondary => "secondary".normal(),
        };
        println!("  • {:<12} {:<16} {}", record.name.cyan(), record.address, role);
    }

    let path = write_inventory(&fleet, &config.inventory).await?;
    let fleet_file = config.inventory.fleet_file();
    save_fleet(&fleet, &fleet_file).await?;

    println!();
    println!(
        "{}",
        format!("✓ Inventory written to {}", path.display())
            .green()
            .bold()
    );
    println!("  fleet state: {}", fleet_file.display().to_string().dimmed());

    Ok(())
}

fn print_progress(progress: Progress<'_>) {
    match progress {
        Progress::Requesting(index, name) => {
            println!();
            println!(
                "{}",
                format!("▶ [{}] Creating {}...", index, name).yellow().bold()
            );
        }
        Progress::Waiting(name) => {
            println!("  ✓ request accepted, waiting for {}", name);
        }
        Progress::Ready(record) => {
            println!("  ✓ {} ready at {}", record.name, record.address.green());
        }
        Progress::CleaningUp(names) => {
            println!();
            println!(
                "{}",
                format!("Deleting {} created instance(s)...", names.len()).yellow()
            );
        }
    }
}

fn report_abort(aborted: &AbortedRun, config: &ProvisionConfig, config_path: Option<&Path>) {
    eprintln!();
    eprintln!(
        "{}",
        format!(
            "✗ Provisioning aborted at {}: {}",
            aborted.failed_instance, aborted.error
        )
        .red()
        .bold()
    );

    eprintln!();
    if aborted.fleet.is_empty() {
        eprintln!("No instance was ready before the failure.");
    } else {
        eprintln!("Ready before the failure:");
        for record in aborted.fleet.records() {
            eprintln!("  • {} {}", record.name, record.address);
        }
    }

    if !aborted.created.is_empty() {
        eprintln!("Created instances: {}", aborted.created.join(", "));
    }

    if let Some(cleanup) = &aborted.cleanup {
        eprintln!("Cleanup: {}", cleanup);
        for failure in &cleanup.failed {
            eprintln!("  ✗ {}: {}", failure.instance, failure.error);
        }
    }

    let leftover = aborted.leftover();
    if !leftover.is_empty() {
        eprintln!();
        eprintln!(
            "{}",
            "⚠ These instances may still exist and keep incurring charges:".yellow()
        );
        for name in &leftover {
            eprintln!("  • {}", name);
        }
        eprintln!(
            "{}",
            format!("  Remove them with: {}", down_command(config, config_path)).dimmed()
        );
    }
}

/// `nodefleet down` invocation that targets the same instances as this run
fn down_command(config: &ProvisionConfig, config_path: Option<&Path>) -> String {
    let mut command = String::from("nodefleet");
    if let Some(path) = config_path {
        command.push_str(&format!(" --config {}", path.display()));
    }
    command.push_str(&format!(
        " down --project {} --zone {} --nodes {} --yes",
        config.project, config.zone, config.nodes
    ));
    command
}
