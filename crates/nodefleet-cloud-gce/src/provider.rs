//! Google Compute Engine provider implementation

use crate::auth::TokenSource;
use crate::client::{ComputeClient, InstanceResource};
use crate::error::Result;
use async_trait::async_trait;
use nodefleet_cloud::{
    CloudError, ComputeApi, Instance, InstanceSpec, Operation, OperationHandle,
};

/// Connection settings for [`GceProvider`]
#[derive(Debug, Clone)]
pub struct GceConfig {
    pub project: String,
    pub token_source: TokenSource,
    /// Override of the Compute API endpoint
    pub base_url: Option<String>,
}

/// Compute Engine provider
pub struct GceProvider {
    client: ComputeClient,
}

impl GceProvider {
    /// Acquire a token and build the client
    pub async fn connect(config: GceConfig) -> Result<Self> {
        let token = config.token_source.token().await?;
        tracing::debug!("Obtained access token for project {}", config.project);

        let mut client = ComputeClient::new(config.project, token)?;
        if let Some(base_url) = config.base_url {
            client = client.with_base_url(base_url);
        }
        Ok(Self { client })
    }

    pub fn from_client(client: ComputeClient) -> Self {
        Self { client }
    }

    pub fn project(&self) -> &str {
        self.client.project()
    }
}

#[async_trait]
impl ComputeApi for GceProvider {
    fn name(&self) -> &str {
        "gce"
    }

    async fn insert_instance(&self, spec: &InstanceSpec) -> nodefleet_cloud::Result<OperationHandle> {
        let rejected = |e: crate::error::GceError| CloudError::ProvisionRequest {
            instance: spec.name.clone(),
            message: e.to_string(),
        };

        let image = &spec.profile.image;
        let image = self
            .client
            .get_image_from_family(&image.project, &image.family)
            .await
            .map_err(rejected)?;
        tracing::debug!("Using image {} for {}", image.name, spec.name);

        let body = InstanceResource::from_spec(spec, &image.self_link);
        let op = self
            .client
            .insert_instance(&spec.zone, &body)
            .await
            .map_err(rejected)?;

        Ok(OperationHandle::new(op.name, &spec.zone))
    }

    async fn get_operation(&self, handle: &OperationHandle) -> nodefleet_cloud::Result<Operation> {
        let mut op = self
            .client
            .get_zone_operation(&handle.zone, &handle.id)
            .await?;
        // The API reports the zone as a URL; keep the short name of the handle
        op.zone = handle.zone.clone();
        Ok(op)
    }

    async fn list_instances(
        &self,
        zone: &str,
        filter: &str,
    ) -> nodefleet_cloud::Result<Vec<Instance>> {
        Ok(self.client.list_instances(zone, filter).await?)
    }

    async fn delete_instance(
        &self,
        zone: &str,
        name: &str,
    ) -> nodefleet_cloud::Result<OperationHandle> {
        let op = self.client.delete_instance(zone, name).await?;
        Ok(OperationHandle::new(op.name, zone))
    }
}
