pub mod down;
pub mod inventory;
pub mod up;

use colored::Colorize;
use nodefleet_cloud_gce::{GceConfig, GceProvider, TokenSource};
use nodefleet_core::ProvisionConfig;

/// Authenticate against Compute Engine for the configured project
pub async fn connect(config: &ProvisionConfig) -> anyhow::Result<GceProvider> {
    println!("{}", "Connecting to Compute Engine...".blue());

    let provider = GceProvider::connect(GceConfig {
        project: config.project.clone(),
        token_source: TokenSource::from_options(
            config.access_token.clone(),
            config.credentials_file.clone(),
        ),
        base_url: config.api_endpoint.clone(),
    })
    .await?;

    Ok(provider)
}
