use async_trait::async_trait;
use nodefleet_cloud::{
    AccessConfig, CloudError, ComputeApi, Instance, InstanceSpec, NetworkInterface, Operation,
    OperationHandle, OperationStatus,
};
use nodefleet_core::{ConfigOverrides, InventoryConfig, ProvisionConfig};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory compute provider with per-instance failure injection
///
/// Every operation reports PENDING, RUNNING, then DONE.
#[derive(Default)]
pub struct FakeCompute {
    pub addresses: HashMap<String, String>,
    pub reject_insert: HashSet<String>,
    pub fail_operation: HashSet<String>,
    pub no_address: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
    polls: Mutex<HashMap<String, usize>>,
}

impl FakeCompute {
    /// node-0..node-(n-1) mapped to 1.1.1.1..1.1.1.n
    pub fn with_nodes(n: usize) -> Self {
        Self {
            addresses: (0..n)
                .map(|i| (format!("node-{}", i), format!("1.1.1.{}", i + 1)))
                .collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn inserted(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix("insert ").map(str::to_string))
            .collect()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix("delete ").map(str::to_string))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ComputeApi for FakeCompute {
    fn name(&self) -> &str {
        "fake"
    }

    async fn insert_instance(&self, spec: &InstanceSpec) -> nodefleet_cloud::Result<OperationHandle> {
        if self.reject_insert.contains(&spec.name) {
            self.record(format!("rejected {}", spec.name));
            return Err(CloudError::ProvisionRequest {
                instance: spec.name.clone(),
                message: "Quota 'CPUS' exceeded".to_string(),
            });
        }
        self.record(format!("insert {}", spec.name));
        Ok(OperationHandle::new(format!("op-insert-{}", spec.name), &spec.zone))
    }

    async fn get_operation(&self, handle: &OperationHandle) -> nodefleet_cloud::Result<Operation> {
        self.record(format!("poll {}", handle.id));
        let mut polls = self.polls.lock().unwrap();
        let count = polls.entry(handle.id.clone()).or_insert(0);
        *count += 1;

        let status = match *count {
            1 => OperationStatus::Pending,
            2 => OperationStatus::Running,
            _ => OperationStatus::Done,
        };

        let target = handle.id.trim_start_matches("op-insert-");
        let error = (status == OperationStatus::Done && self.fail_operation.contains(target))
            .then(|| serde_json::json!({"errors": [{"code": "RESOURCE_NOT_READY"}]}));

        Ok(Operation {
            name: handle.id.clone(),
            zone: handle.zone.clone(),
            status,
            error,
            target_link: None,
        })
    }

    async fn list_instances(
        &self,
        _zone: &str,
        filter: &str,
    ) -> nodefleet_cloud::Result<Vec<Instance>> {
        let name = filter.trim_start_matches("name=").to_string();
        self.record(format!("list {}", name));

        let Some(address) = self.addresses.get(&name) else {
            return Ok(Vec::new());
        };
        let nat_ip = (!self.no_address.contains(&name)).then(|| address.clone());

        Ok(vec![Instance {
            name: name.clone(),
            status: Some("RUNNING".to_string()),
            network_interfaces: vec![NetworkInterface {
                network_ip: Some("10.142.0.2".to_string()),
                access_configs: vec![AccessConfig {
                    name: Some("External NAT".to_string()),
                    nat_ip,
                }],
            }],
        }])
    }

    async fn delete_instance(
        &self,
        zone: &str,
        name: &str,
    ) -> nodefleet_cloud::Result<OperationHandle> {
        self.record(format!("delete {}", name));
        Ok(OperationHandle::new(format!("op-delete-{}", name), zone))
    }
}

pub fn test_config(nodes: usize) -> ProvisionConfig {
    ProvisionConfig {
        inventory: InventoryConfig {
            user: "alice".to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
    .with_overrides(ConfigOverrides {
        project: Some("demo-project".to_string()),
        nodes: Some(nodes),
        ..Default::default()
    })
}
