//! Scripted in-memory provider for unit tests

use crate::error::{CloudError, Result};
use crate::model::{Instance, InstanceSpec, Operation, OperationHandle, OperationStatus};
use crate::provider::ComputeApi;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub(crate) fn operation(name: &str, status: OperationStatus) -> Operation {
    Operation {
        name: name.to_string(),
        zone: "us-east1-b".to_string(),
        status,
        error: None,
        target_link: None,
    }
}

#[derive(Default)]
pub(crate) struct ScriptedApi {
    /// Replies to get_operation, consumed front to back
    pub polls: Mutex<VecDeque<Operation>>,
    pub poll_count: Mutex<usize>,
    pub instances: Mutex<HashMap<String, Vec<Instance>>>,
    pub reject_insert: Option<String>,
    pub fail_delete: Vec<String>,
    pub deleted: Mutex<Vec<String>>,
    pub inserted: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub fn with_polls(statuses: &[OperationStatus]) -> Self {
        Self {
            polls: Mutex::new(
                statuses
                    .iter()
                    .map(|s| operation("operation-1", *s))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    pub fn polls(&self) -> usize {
        *self.poll_count.lock().unwrap()
    }
}

#[async_trait]
impl ComputeApi for ScriptedApi {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn insert_instance(&self, spec: &InstanceSpec) -> Result<OperationHandle> {
        if let Some(message) = &self.reject_insert {
            return Err(CloudError::ApiError {
                status: 403,
                message: message.clone(),
            });
        }
        self.inserted.lock().unwrap().push(spec.name.clone());
        Ok(OperationHandle::new(format!("insert-{}", spec.name), &spec.zone))
    }

    async fn get_operation(&self, handle: &OperationHandle) -> Result<Operation> {
        *self.poll_count.lock().unwrap() += 1;
        let mut polls = self.polls.lock().unwrap();
        let next = if polls.len() > 1 {
            polls.pop_front()
        } else {
            polls.front().cloned()
        };
        let mut op = next.unwrap_or_else(|| operation(&handle.id, OperationStatus::Done));
        op.name = handle.id.clone();
        Ok(op)
    }

    async fn list_instances(&self, _zone: &str, filter: &str) -> Result<Vec<Instance>> {
        let name = filter.trim_start_matches("name=");
        Ok(self
            .instances
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_instance(&self, zone: &str, name: &str) -> Result<OperationHandle> {
        if self.fail_delete.iter().any(|n| n == name) {
            return Err(CloudError::ApiError {
                status: 500,
                message: format!("backend error deleting {}", name),
            });
        }
        self.deleted.lock().unwrap().push(name.to_string());
        Ok(OperationHandle::new(format!("delete-{}", name), zone))
    }
}
