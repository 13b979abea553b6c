use async_trait::async_trait;
use fleetlb_application::ports::ComputeClient;
use fleetlb_domain::fleet::{FleetRecord, FleetTemplateDelta};
use fleetlb_domain::instance::{InstanceDelta, InstanceRecord};
use fleetlb_domain::network::{NetworkInterfaceRecord, PublicIpRecord};
use fleetlb_domain::DomainError;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Bounds every remote call of the wrapped client by a deadline.
pub struct TimeoutComputeClient {
    inner: Arc<dyn ComputeClient>,
    timeout: Duration,
}

impl TimeoutComputeClient {
    pub fn new(inner: Arc<dyn ComputeClient>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, DomainError>>,
    ) -> Result<T, DomainError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| {
                warn!(
                    operation = operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Remote call exceeded its deadline"
                );
                DomainError::RemoteTimeout {
                    operation: operation.to_string(),
                }
            })?
    }
}

#[async_trait]
impl ComputeClient for TimeoutComputeClient {
    async fn list_fleets(&self, resource_group: &str) -> Result<Vec<FleetRecord>, DomainError> {
        self.bounded("list_fleets", self.inner.list_fleets(resource_group))
            .await
    }

    async fn list_instances(
        &self,
        resource_group: &str,
        fleet_name: &str,
        with_instance_view: bool,
    ) -> Result<Vec<InstanceRecord>, DomainError> {
        self.bounded(
            "list_instances",
            self.inner
                .list_instances(resource_group, fleet_name, with_instance_view),
        )
        .await
    }

    async fn update_instances_batch(
        &self,
        resource_group: &str,
        fleet_name: &str,
        deltas: HashMap<String, InstanceDelta>,
        operation: &str,
        batch_size: usize,
    ) -> Result<(), DomainError> {
        self.bounded(
            "update_instances_batch",
            self.inner.update_instances_batch(
                resource_group,
                fleet_name,
                deltas,
                operation,
                batch_size,
            ),
        )
        .await
    }

    async fn update_fleet_template(
        &self,
        resource_group: &str,
        fleet_name: &str,
        delta: FleetTemplateDelta,
    ) -> Result<(), DomainError> {
        self.bounded(
            "update_fleet_template",
            self.inner
                .update_fleet_template(resource_group, fleet_name, delta),
        )
        .await
    }

    async fn get_network_interface(
        &self,
        resource_group: &str,
        fleet_name: &str,
        instance_id: &str,
        nic_name: &str,
    ) -> Result<NetworkInterfaceRecord, DomainError> {
        self.bounded(
            "get_network_interface",
            self.inner
                .get_network_interface(resource_group, fleet_name, instance_id, nic_name),
        )
        .await
    }

    async fn get_public_ip(
        &self,
        resource_group: &str,
        fleet_name: &str,
        instance_id: &str,
        nic_name: &str,
        ip_configuration_name: &str,
        public_ip_name: &str,
    ) -> Result<PublicIpRecord, DomainError> {
        self.bounded(
            "get_public_ip",
            self.inner.get_public_ip(
                resource_group,
                fleet_name,
                instance_id,
                nic_name,
                ip_configuration_name,
                public_ip_name,
            ),
        )
        .await
    }
}
