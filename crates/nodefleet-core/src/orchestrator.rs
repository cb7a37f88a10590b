//! Fleet orchestrator
//!
//! Provisions the fleet strictly one instance at a time:
//! request → wait → resolve → record. The first failure stops the run;
//! nothing after it is attempted.

use crate::config::ProvisionConfig;
use crate::error::{AbortedRun, FleetError, Result};
use crate::fleet::{Fleet, FleetRecord};
use nodefleet_cloud::{
    AddressKind, ComputeApi, InstanceSpec, TeardownResult, delete_instances, provision_instance,
    resolve_address, wait_for_operation,
};

/// Step notifications for operator output
#[derive(Debug, Clone, PartialEq)]
pub enum Progress<'a> {
    /// Creation request about to be sent (index, name)
    Requesting(usize, &'a str),
    /// Request accepted, waiting for the operation
    Waiting(&'a str),
    /// Instance ready with its address
    Ready(&'a FleetRecord),
    /// Run aborted; best-effort deletion of these instances starts
    CleaningUp(&'a [String]),
}

pub struct FleetOrchestrator<'a> {
    api: &'a dyn ComputeApi,
    config: &'a ProvisionConfig,
}

impl<'a> FleetOrchestrator<'a> {
    pub fn new(api: &'a dyn ComputeApi, config: &'a ProvisionConfig) -> Self {
        Self { api, config }
    }

    /// Provision the whole fleet
    pub async fn run(&self) -> Result<Fleet> {
        self.run_with_progress(|_| {}).await
    }

    /// Provision the whole fleet, reporting each step to `on_progress`
    ///
    /// # Returns
    /// * `Ok(Fleet)` - exactly `nodes` records in creation order
    /// * `Err(FleetError::Aborted)` - the partial state at the failure
    pub async fn run_with_progress<F>(&self, mut on_progress: F) -> Result<Fleet>
    where
        F: FnMut(Progress<'_>),
    {
        self.config.validate()?;

        let profile = self.config.machine_profile();
        let kind = AddressKind::from(profile.network_mode);
        let mut fleet = Fleet::new();
        let mut created: Vec<String> = Vec::new();

        tracing::info!(
            "Provisioning {} instance(s) via {} in {}",
            self.config.nodes,
            self.api.name(),
            self.config.zone
        );

        for (index, name) in self.config.instance_names().into_iter().enumerate() {
            on_progress(Progress::Requesting(index, &name));
            let spec = InstanceSpec::new(&name, &self.config.zone, profile.clone());

            match self
                .provision_one(&spec, kind, &mut created, &mut on_progress)
                .await
            {
                Ok(record) => {
                    on_progress(Progress::Ready(&record));
                    fleet.push(record);
                }
                Err(error) => {
                    tracing::error!("Provisioning stopped at {}: {}", name, error);
                    let cleanup = self.cleanup(&created, &mut on_progress).await;
                    return Err(FleetError::Aborted(Box::new(AbortedRun {
                        fleet,
                        created,
                        failed_instance: name,
                        error,
                        cleanup,
                    })));
                }
            }
        }

        tracing::info!("Fleet of {} instance(s) ready", fleet.len());
        Ok(fleet)
    }

    async fn provision_one<F>(
        &self,
        spec: &InstanceSpec,
        kind: AddressKind,
        created: &mut Vec<String>,
        on_progress: &mut F,
    ) -> nodefleet_cloud::Result<FleetRecord>
    where
        F: FnMut(Progress<'_>),
    {
        let handle = provision_instance(self.api, spec).await?;
        // From here on the instance exists remotely, whatever happens next
        created.push(spec.name.clone());

        on_progress(Progress::Waiting(&spec.name));
        wait_for_operation(self.api, &handle, &self.config.wait).await?;

        let address = resolve_address(self.api, &spec.zone, &spec.name, kind).await?;
        Ok(FleetRecord::new(&spec.name, address))
    }

    async fn cleanup<F>(&self, created: &[String], on_progress: &mut F) -> Option<TeardownResult>
    where
        F: FnMut(Progress<'_>),
    {
        if !self.config.cleanup_on_failure || created.is_empty() {
            return None;
        }

        on_progress(Progress::CleaningUp(created));
        let result = delete_instances(self.api, &self.config.zone, created, &self.config.wait).await;
        tracing::info!("Cleanup after abort: {}", result);
        Some(result)
    }

    /// Delete every instance the configuration names
    pub async fn teardown(&self) -> TeardownResult {
        let names = self.config.instance_names();
        delete_instances(self.api, &self.config.zone, &names, &self.config.wait).await
    }
}
