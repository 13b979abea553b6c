use async_trait::async_trait;
use fleetlb_application::ports::NodeManager;
use fleetlb_domain::network::NetworkInterfaceRecord;
use fleetlb_domain::{
    BackendPoolTarget, CidrMasks, DomainError, LoadBalancerMode, Node, NodeAddresses, Zone,
};
use tracing::debug;

/// Fixed machine set manager for deployments without standalone VMs.
///
/// Every lookup reports the node as absent and membership changes are no-ops.
#[derive(Debug, Default)]
pub struct UnmanagedFixedSet;

impl UnmanagedFixedSet {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NodeManager for UnmanagedFixedSet {
    async fn get_power_status(&self, _node_name: &str) -> Result<String, DomainError> {
        Err(DomainError::InstanceNotFound)
    }

    async fn get_provisioning_state(
        &self,
        _node_name: &str,
    ) -> Result<Option<String>, DomainError> {
        Err(DomainError::InstanceNotFound)
    }

    async fn get_instance_id(&self, _node_name: &str) -> Result<String, DomainError> {
        Err(DomainError::InstanceNotFound)
    }

    async fn get_instance_type(&self, _node_name: &str) -> Result<String, DomainError> {
        Err(DomainError::InstanceNotFound)
    }

    async fn get_node_name_by_provider_id(
        &self,
        _provider_id: &str,
    ) -> Result<Option<String>, DomainError> {
        Ok(None)
    }

    async fn get_node_name_by_ip_configuration_id(
        &self,
        _ip_configuration_id: &str,
    ) -> Result<(String, String), DomainError> {
        Err(DomainError::InstanceNotFound)
    }

    async fn get_primary_interface(
        &self,
        _node_name: &str,
    ) -> Result<NetworkInterfaceRecord, DomainError> {
        Err(DomainError::InstanceNotFound)
    }

    async fn get_ip_by_node_name(&self, _node_name: &str) -> Result<NodeAddresses, DomainError> {
        Err(DomainError::InstanceNotFound)
    }

    async fn get_private_ips(&self, _node_name: &str) -> Result<Vec<String>, DomainError> {
        Err(DomainError::InstanceNotFound)
    }

    async fn get_zone(&self, _node_name: &str) -> Result<Zone, DomainError> {
        Err(DomainError::InstanceNotFound)
    }

    fn get_primary_vm_set_name(&self) -> String {
        String::new()
    }

    async fn get_node_vm_set_name(&self, _node: &Node) -> Result<String, DomainError> {
        Err(DomainError::InstanceNotFound)
    }

    async fn get_vm_set_names(
        &self,
        _mode: &LoadBalancerMode,
        _nodes: &[Node],
    ) -> Result<Vec<String>, DomainError> {
        Ok(Vec::new())
    }

    async fn ensure_host_in_pool(
        &self,
        node: &Node,
        target: &BackendPoolTarget,
    ) -> Result<(), DomainError> {
        debug!(node = %node.name, pool = %target.backend_pool_id, "Skipping node outside any scale set");
        Ok(())
    }

    async fn ensure_hosts_in_pool(
        &self,
        nodes: &[Node],
        target: &BackendPoolTarget,
    ) -> Result<(), DomainError> {
        debug!(nodes = nodes.len(), pool = %target.backend_pool_id, "Skipping nodes outside any scale set");
        Ok(())
    }

    async fn ensure_backend_pool_deleted(
        &self,
        backend_pool_id: &str,
        _vm_set_name: &str,
        _ip_configuration_ids: &[String],
        _delete_from_vm_set: bool,
    ) -> Result<(), DomainError> {
        debug!(pool = %backend_pool_id, "No fixed set members to remove");
        Ok(())
    }

    async fn get_node_cidr_masks_by_provider_id(
        &self,
        _provider_id: &str,
    ) -> Result<CidrMasks, DomainError> {
        Ok(CidrMasks::default())
    }
}
