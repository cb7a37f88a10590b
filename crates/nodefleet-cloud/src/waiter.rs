//! Operation waiter
//!
//! Polls an asynchronous provider operation until it reports `DONE`.

use crate::error::{CloudError, Result};
use crate::model::{Operation, OperationHandle};
use crate::provider::{ComputeApi, WaitConfig};
use tokio::time::{Instant, sleep, timeout};

/// Block until the operation is terminal
///
/// # Returns
/// * `Ok(Operation)` - the DONE operation, without an error payload
/// * `Err(CloudError::OperationFailed)` - DONE with a provider error payload
/// * `Err(CloudError::OperationTimeout)` - `config.timeout()` elapsed first,
///   including while a single poll is still in flight
pub async fn wait_for_operation(
    api: &dyn ComputeApi,
    handle: &OperationHandle,
    config: &WaitConfig,
) -> Result<Operation> {
    let started = Instant::now();
    let limit = config.timeout();
    let mut attempt: u32 = 0;
    let timed_out = || CloudError::OperationTimeout {
        operation: handle.id.clone(),
        waited_secs: started.elapsed().as_secs(),
    };

    tracing::info!("Waiting for operation {} to finish", handle);

    loop {
        let poll = api.get_operation(handle);
        let mut op = match limit {
            Some(limit) => timeout(limit.saturating_sub(started.elapsed()), poll)
                .await
                .map_err(|_| timed_out())??,
            None => poll.await?,
        };
        tracing::debug!("Operation {} is {} (poll {})", handle, op.status, attempt + 1);

        if op.status.is_terminal() {
            if let Some(payload) = op.error.take() {
                return Err(CloudError::OperationFailed {
                    operation: handle.id.clone(),
                    payload,
                });
            }
            tracing::info!("Operation {} done", handle);
            return Ok(op);
        }

        let delay = config.delay_for_attempt(attempt);
        if let Some(limit) = limit {
            if started.elapsed() + delay > limit {
                return Err(timed_out());
            }
        }

        sleep(delay).await;
        attempt = attempt.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{ScriptedApi, operation};
    use crate::model::OperationStatus::{Done, Pending, Running};
    use crate::model::{Instance, InstanceSpec};
    use async_trait::async_trait;
    use std::time::Duration;

    /// Provider whose operation lookups never answer
    struct Unresponsive;

    #[async_trait]
    impl ComputeApi for Unresponsive {
        fn name(&self) -> &str {
            "unresponsive"
        }

        async fn insert_instance(&self, _spec: &InstanceSpec) -> Result<OperationHandle> {
            unreachable!()
        }

        async fn get_operation(&self, _handle: &OperationHandle) -> Result<Operation> {
            std::future::pending().await
        }

        async fn list_instances(&self, _zone: &str, _filter: &str) -> Result<Vec<Instance>> {
            unreachable!()
        }

        async fn delete_instance(&self, _zone: &str, _name: &str) -> Result<OperationHandle> {
            unreachable!()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_done() {
        let api = ScriptedApi::with_polls(&[Pending, Running, Done]);
        let handle = OperationHandle::new("operation-1", "us-east1-b");
        let started = Instant::now();

        let op = wait_for_operation(&api, &handle, &WaitConfig::default())
            .await
            .unwrap();

        assert_eq!(op.status, Done);
        assert_eq!(api.polls(), 3);
        // Two one-second sleeps between three polls
        assert_eq!(started.elapsed().as_secs(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_on_first_poll_does_not_sleep() {
        let api = ScriptedApi::with_polls(&[Done]);
        let handle = OperationHandle::new("operation-1", "us-east1-b");
        let started = Instant::now();

        wait_for_operation(&api, &handle, &WaitConfig::default())
            .await
            .unwrap();

        assert_eq!(api.polls(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_payload_fails_operation() {
        let mut failed = operation("operation-1", Done);
        failed.error = Some(serde_json::json!({
            "errors": [{"code": "ZONE_RESOURCE_POOL_EXHAUSTED", "message": "exhausted"}]
        }));
        let api = ScriptedApi::with_polls(&[Pending]);
        api.polls.lock().unwrap().push_front(operation("operation-1", Pending));
        api.polls.lock().unwrap().push_back(failed);
        let handle = OperationHandle::new("operation-1", "us-east1-b");

        let err = wait_for_operation(&api, &handle, &WaitConfig::default())
            .await
            .unwrap_err();

        match err {
            CloudError::OperationFailed { operation, payload } => {
                assert_eq!(operation, "operation-1");
                assert_eq!(payload["errors"][0]["code"], "ZONE_RESOURCE_POOL_EXHAUSTED");
            }
            other => panic!("Expected OperationFailed, got {:?}", other),
        }
        assert_eq!(api.polls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_when_never_done() {
        let api = ScriptedApi::with_polls(&[Running]);
        let handle = OperationHandle::new("operation-1", "us-east1-b");
        let config = WaitConfig {
            timeout_secs: Some(5),
            ..Default::default()
        };

        let err = wait_for_operation(&api, &handle, &config)
            .await
            .unwrap_err();

        assert!(matches!(err, CloudError::OperationTimeout { .. }));
        // Polls at t=0..=5, the sixth sleep would cross the limit
        assert_eq!(api.polls(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_poll_is_bounded_by_timeout() {
        let handle = OperationHandle::new("operation-1", "us-east1-b");
        let config = WaitConfig {
            timeout_secs: Some(5),
            ..Default::default()
        };
        let started = Instant::now();

        let result = tokio::time::timeout(
            Duration::from_secs(3600),
            wait_for_operation(&Unresponsive, &handle, &config),
        )
        .await
        .expect("waiter must give up on its own");

        match result {
            Err(CloudError::OperationTimeout { operation, waited_secs }) => {
                assert_eq!(operation, "operation-1");
                assert_eq!(waited_secs, 5);
            }
            other => panic!("Expected OperationTimeout, got {:?}", other),
        }
        assert_eq!(started.elapsed(), Duration::from_secs(5));
    }
}
