mod commands;

use clap::{Args, Parser, Subcommand};
use nodefleet_core::{ConfigOverrides, ProvisionConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nodefleet")]
#[command(
    about = "Provision a fleet of Compute Engine instances and write an Ansible inventory",
    long_about = None
)]
struct Cli {
    /// Configuration file (default: nodefleet.local.toml / nodefleet.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Where the fleet lives
#[derive(Args, Debug, Default)]
struct TargetArgs {
    /// Cloud project
    #[arg(short, long)]
    project: Option<String>,
    /// Compute zone
    #[arg(short, long)]
    zone: Option<String>,
    /// Number of instances
    #[arg(short, long)]
    nodes: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the instances and write the inventory
    Up {
        #[command(flatten)]
        target: TargetArgs,
        /// Inventory file to write
        #[arg(short, long)]
        inventory: Option<PathBuf>,
        /// ansible_user written for every host
        #[arg(short, long)]
        user: Option<String>,
        /// Delete already created instances when the run aborts
        #[arg(long)]
        cleanup_on_failure: bool,
    },
    /// Delete the fleet's instances
    Down {
        #[command(flatten)]
        target: TargetArgs,
        /// Skip the safety stop and delete
        #[arg(short, long)]
        yes: bool,
    },
    /// Rebuild the inventory from a saved fleet.json
    Inventory {
        /// Fleet file written by `up` (default: fleet.json next to the inventory)
        #[arg(short, long)]
        from: Option<PathBuf>,
        /// Inventory file to write
        #[arg(short, long)]
        inventory: Option<PathBuf>,
        /// ansible_user written for every host
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Show version information
    Version,
}

impl TargetArgs {
    fn into_overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            project: self.project,
            zone: self.zone,
            nodes: self.nodes,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is operator output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match cli.command {
        Commands::Version => {
            println!("nodefleet {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Up {
            target,
            inventory,
            user,
            cleanup_on_failure,
        } => {
            let overrides = ConfigOverrides {
                inventory_path: inventory,
                user,
                cleanup_on_failure,
                ..target.into_overrides()
            };
            let config = ProvisionConfig::load(cli.config.as_deref(), overrides)?;
            commands::up::handle(&config, cli.config.as_deref()).await
        }
        Commands::Down { target, yes } => {
            let config = ProvisionConfig::load(cli.config.as_deref(), target.into_overrides())?;
            commands::down::handle(&config, yes).await
        }
        Commands::Inventory {
            from,
            inventory,
            user,
        } => {
            let overrides = ConfigOverrides {
                inventory_path: inventory,
                user,
                ..Default::default()
            };
            let config = ProvisionConfig::load(cli.config.as_deref(), overrides)?;
            commands::inventory::handle(&config, from).await
        }
    }
}
