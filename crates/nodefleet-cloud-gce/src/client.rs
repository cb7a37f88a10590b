//! Compute Engine v1 REST client
//!
//! Direct API implementation covering images, instances and zone operations.
//! Uses Bearer token authentication.

use crate::error::{GceError, Result};
use nodefleet_cloud::{Instance, InstanceSpec, NetworkMode, Operation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const COMPUTE_API_BASE: &str = "https://compute.googleapis.com/compute/v1";
const SCOPE_PREFIX: &str = "https://www.googleapis.com/auth/";

/// Upper bound for a single API call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Compute Engine client bound to one project
pub struct ComputeClient {
    client: reqwest::Client,
    base_url: String,
    project: String,
    token: String,
}

impl ComputeClient {
    pub fn new(project: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: COMPUTE_API_BASE.to_string(),
            project: project.into(),
            token: token.into(),
        })
    }

    /// Point the client at another endpoint (emulators, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    fn zone_url(&self, zone: &str) -> String {
        format!("{}/projects/{}/zones/{}", self.base_url, self.project, zone)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GceError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        Ok(response.json().await?)
    }

    /// Newest non-deprecated image of a family
    pub async fn get_image_from_family(&self, image_project: &str, family: &str) -> Result<Image> {
        let url = format!(
            "{}/projects/{}/global/images/family/{}",
            self.base_url, image_project, family
        );
        tracing::debug!("GET {}", url);
        self.send(self.client.get(&url)).await
    }

    pub async fn insert_instance(&self, zone: &str, body: &InstanceResource) -> Result<Operation> {
        let url = format!("{}/instances", self.zone_url(zone));
        tracing::debug!("POST {} ({})", url, body.name);
        self.send(self.client.post(&url).json(body)).await
    }

    pub async fn get_zone_operation(&self, zone: &str, operation: &str) -> Result<Operation> {
        let url = format!("{}/operations/{}", self.zone_url(zone), operation);
        tracing::debug!("GET {}", url);
        self.send(self.client.get(&url)).await
    }

    pub async fn list_instances(&self, zone: &str, filter: &str) -> Result<Vec<Instance>> {
        let url = format!("{}/instances", self.zone_url(zone));
        tracing::debug!("GET {} filter={}", url, filter);
        let list: InstanceList = self
            .send(self.client.get(&url).query(&[("filter", filter)]))
            .await?;
        Ok(list.items)
    }

    pub async fn delete_instance(&self, zone: &str, name: &str) -> Result<Operation> {
        let url = format!("{}/instances/{}", self.zone_url(zone), name);
        tracing::debug!("DELETE {}", url);
        self.send(self.client.delete(&url)).await
    }
}

/// Pull the human readable message out of a Google API error body
pub fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorResponse>(body)
        .map(|r| r.error.message)
        .unwrap_or_else(|_| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "empty response body".to_string()
            } else {
                trimmed.to_string()
            }
        })
}

/// Expand a short scope name like "logging.write" to its URL form
pub fn expand_scope(scope: &str) -> String {
    if scope.starts_with("https://") {
        scope.to_string()
    } else {
        format!("{}{}", SCOPE_PREFIX, scope)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct InstanceList {
    #[serde(default)]
    items: Vec<Instance>,
}

/// Image resource, only the fields needed to boot from it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub name: String,
    pub self_link: String,
}

/// Request body of `instances.insert`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceResource {
    pub name: String,
    pub machine_type: String,
    pub disks: Vec<AttachedDisk>,
    pub network_interfaces: Vec<NetworkInterfaceResource>,
    pub service_accounts: Vec<ServiceAccount>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDisk {
    pub boot: bool,
    pub auto_delete: bool,
    pub initialize_params: InitializeParams,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub source_image: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceResource {
    pub network: String,
    pub access_configs: Vec<AccessConfigResource>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessConfigResource {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceAccount {
    pub email: String,
    pub scopes: Vec<String>,
}

impl InstanceResource {
    /// Build the insert body for `spec`, booting from `source_image`
    pub fn from_spec(spec: &InstanceSpec, source_image: &str) -> Self {
        let profile = &spec.profile;

        let access_configs = match profile.network_mode {
            NetworkMode::Public => vec![AccessConfigResource {
                kind: "ONE_TO_ONE_NAT".to_string(),
                name: "External NAT".to_string(),
            }],
            NetworkMode::Private => Vec::new(),
        };

        Self {
            name: spec.name.clone(),
            machine_type: format!("zones/{}/machineTypes/{}", spec.zone, profile.machine_type),
            disks: vec![AttachedDisk {
                boot: true,
                auto_delete: profile.disk_auto_delete,
                initialize_params: InitializeParams {
                    source_image: source_image.to_string(),
                },
            }],
            network_interfaces: vec![NetworkInterfaceResource {
                network: profile.network.clone(),
                access_configs,
            }],
            service_accounts: vec![ServiceAccount {
                email: profile.service_account.clone(),
                scopes: profile.scopes.iter().map(|s| expand_scope(s)).collect(),
            }],
        }
    }
}
