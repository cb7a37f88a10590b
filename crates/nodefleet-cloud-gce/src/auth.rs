//! Access token acquisition
//!
//! Tokens come either from configuration or from the gcloud CLI. Validity of
//! the returned token is left to the Compute API to judge.

use crate::error::{GceError, Result};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// gcloud property override pointing at a service account key file
const CREDENTIAL_FILE_OVERRIDE_ENV: &str = "CLOUDSDK_AUTH_CREDENTIAL_FILE_OVERRIDE";

/// Where the bearer token for the Compute API comes from
#[derive(Debug, Clone)]
pub enum TokenSource {
    /// A token supplied directly
    Static(String),
    /// `gcloud auth print-access-token`, optionally for a key file
    Gcloud { credentials_file: Option<PathBuf> },
}

impl TokenSource {
    /// Pick the static token when one is configured, gcloud otherwise
    pub fn from_options(access_token: Option<String>, credentials_file: Option<PathBuf>) -> Self {
        match access_token.filter(|t| !t.trim().is_empty()) {
            Some(token) => TokenSource::Static(token.trim().to_string()),
            None => TokenSource::Gcloud { credentials_file },
        }
    }

    pub async fn token(&self) -> Result<String> {
        match self {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::Gcloud { credentials_file } => {
                Gcloud::new(credentials_file.clone()).print_access_token().await
            }
        }
    }
}

/// gcloud CLI wrapper
pub struct Gcloud {
    credentials_file: Option<PathBuf>,
}

impl Gcloud {
    pub fn new(credentials_file: Option<PathBuf>) -> Self {
        Self { credentials_file }
    }

    /// Check that gcloud is on PATH
    async fn ensure_installed(&self) -> Result<()> {
        let which = Command::new("which")
            .arg("gcloud")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;

        if !which.success() {
            return Err(GceError::GcloudNotFound);
        }
        Ok(())
    }

    /// Run a gcloud command and return stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("gcloud");
        cmd.args(args);
        if let Some(path) = &self.credentials_file {
            cmd.env(CREDENTIAL_FILE_OVERRIDE_ENV, path);
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: gcloud {}", args.join(" "));

        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GceError::CommandFailed(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Obtain an OAuth access token for the active or overridden account
    pub async fn print_access_token(&self) -> Result<String> {
        self.ensure_installed().await?;

        let output = self
            .run_command(&["auth", "print-access-token"])
            .await
            .map_err(|e| match e {
                GceError::CommandFailed(msg) => GceError::AuthenticationFailed(msg),
                other => other,
            })?;

        let token = output.trim();
        if token.is_empty() {
            return Err(GceError::AuthenticationFailed(
                "gcloud returned an empty access token".to_string(),
            ));
        }
        Ok(token.to_string())
    }
}
