use async_trait::async_trait;
use fleetlb_domain::fleet::{FleetRecord, FleetTemplateDelta};
use fleetlb_domain::instance::{InstanceDelta, InstanceRecord};
use fleetlb_domain::network::{NetworkInterfaceRecord, PublicIpRecord};
use fleetlb_domain::DomainError;
use std::collections::HashMap;

/// Cloud control-plane client for scale sets and their instances.
///
/// Absent resources are reported as [`DomainError::NotFound`]; every other failure is
/// [`DomainError::Remote`] or [`DomainError::RemoteTimeout`].
#[async_trait]
pub trait ComputeClient: Send + Sync {
    async fn list_fleets(&self, resource_group: &str) -> Result<Vec<FleetRecord>, DomainError>;

    async fn list_instances(
        &self,
        resource_group: &str,
        fleet_name: &str,
        with_instance_view: bool,
    ) -> Result<Vec<InstanceRecord>, DomainError>;

    /// Apply per-instance deltas keyed by instance id. `batch_size` 0 sends everything at once.
    async fn update_instances_batch(
        &self,
        resource_group: &str,
        fleet_name: &str,
        deltas: HashMap<String, InstanceDelta>,
        operation: &str,
        batch_size: usize,
    ) -> Result<(), DomainError>;

    async fn update_fleet_template(
        &self,
        resource_group: &str,
        fleet_name: &str,
        delta: FleetTemplateDelta,
    ) -> Result<(), DomainError>;

    async fn get_network_interface(
        &self,
        resource_group: &str,
        fleet_name: &str,
        instance_id: &str,
        nic_name: &str,
    ) -> Result<NetworkInterfaceRecord, DomainError>;

    async fn get_public_ip(
        &self,
        resource_group: &str,
        fleet_name: &str,
        instance_id: &str,
        nic_name: &str,
        ip_configuration_name: &str,
        public_ip_name: &str,
    ) -> Result<PublicIpRecord, DomainError>;
}
