use async_trait::async_trait;
use fleetlb_domain::network::NetworkInterfaceRecord;
use fleetlb_domain::{
    BackendPoolTarget, CidrMasks, DomainError, LoadBalancerMode, Node, NodeAddresses, Zone,
};

/// Node-level capabilities the cluster control loop relies on.
///
/// Implemented by the scale-set engine and by the fixed machine set collaborator. Lookups
/// for nodes that cannot be located fail with [`DomainError::InstanceNotFound`].
#[async_trait]
pub trait NodeManager: Send + Sync {
    async fn get_power_status(&self, node_name: &str) -> Result<String, DomainError>;

    async fn get_provisioning_state(&self, node_name: &str)
        -> Result<Option<String>, DomainError>;

    /// Full resource id of the node's VM.
    async fn get_instance_id(&self, node_name: &str) -> Result<String, DomainError>;

    /// VM size, empty when the control plane did not report one.
    async fn get_instance_type(&self, node_name: &str) -> Result<String, DomainError>;

    /// `None` when the provider id belongs to this manager but names no known VM.
    async fn get_node_name_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<Option<String>, DomainError>;

    /// Node name and VM set name owning an IP configuration.
    async fn get_node_name_by_ip_configuration_id(
        &self,
        ip_configuration_id: &str,
    ) -> Result<(String, String), DomainError>;

    async fn get_primary_interface(
        &self,
        node_name: &str,
    ) -> Result<NetworkInterfaceRecord, DomainError>;

    async fn get_ip_by_node_name(&self, node_name: &str) -> Result<NodeAddresses, DomainError>;

    async fn get_private_ips(&self, node_name: &str) -> Result<Vec<String>, DomainError>;

    async fn get_zone(&self, node_name: &str) -> Result<Zone, DomainError>;

    fn get_primary_vm_set_name(&self) -> String;

    async fn get_node_vm_set_name(&self, node: &Node) -> Result<String, DomainError>;

    /// VM sets a load balancer should be attached to for `mode`.
    async fn get_vm_set_names(
        &self,
        mode: &LoadBalancerMode,
        nodes: &[Node],
    ) -> Result<Vec<String>, DomainError>;

    async fn ensure_host_in_pool(
        &self,
        node: &Node,
        target: &BackendPoolTarget,
    ) -> Result<(), DomainError>;

    async fn ensure_hosts_in_pool(
        &self,
        nodes: &[Node],
        target: &BackendPoolTarget,
    ) -> Result<(), DomainError>;

    async fn ensure_backend_pool_deleted(
        &self,
        backend_pool_id: &str,
        vm_set_name: &str,
        ip_configuration_ids: &[String],
        delete_from_vm_set: bool,
    ) -> Result<(), DomainError>;

    async fn get_node_cidr_masks_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<CidrMasks, DomainError>;
}
