#![allow(dead_code)]
use async_trait::async_trait;
use fleetlb_application::ports::NodeManager;
use fleetlb_domain::network::NetworkInterfaceRecord;
use fleetlb_domain::{
    BackendPoolTarget, CidrMasks, DomainError, LoadBalancerMode, Node, NodeAddresses, Zone,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Fixed machine set that answers every lookup for known VM names and records delegations.
pub struct RecordingFixedSet {
    ensured: Arc<RwLock<Vec<String>>>,
    lookups: Arc<RwLock<Vec<String>>>,
}

impl RecordingFixedSet {
    pub fn new() -> Self {
        Self {
            ensured: Arc::new(RwLock::new(Vec::new())),
            lookups: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn ensured(&self) -> Vec<String> {
        let mut nodes = self.ensured.read().await.clone();
        nodes.sort();
        nodes
    }

    pub async fn lookups(&self) -> Vec<String> {
        self.lookups.read().await.clone()
    }

    async fn looked_up(&self, key: &str) {
        self.lookups.write().await.push(key.to_string());
    }
}

#[async_trait]
impl NodeManager for RecordingFixedSet {
    async fn get_power_status(&self, node_name: &str) -> Result<String, DomainError> {
        self.looked_up(node_name).await;
        Ok("running".to_string())
    }

    async fn get_provisioning_state(&self, node_name: &str) -> Result<Option<String>, DomainError> {
        self.looked_up(node_name).await;
        Ok(Some("Succeeded".to_string()))
    }

    async fn get_instance_id(&self, node_name: &str) -> Result<String, DomainError> {
        self.looked_up(node_name).await;
        Ok(format!("fixed/{}", node_name))
    }

    async fn get_instance_type(&self, node_name: &str) -> Result<String, DomainError> {
        self.looked_up(node_name).await;
        Ok("Standard_A1".to_string())
    }

    async fn get_node_name_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<Option<String>, DomainError> {
        self.looked_up(provider_id).await;
        Ok(Some("fixed-vm".to_string()))
    }

    async fn get_node_name_by_ip_configuration_id(
        &self,
        ip_configuration_id: &str,
    ) -> Result<(String, String), DomainError> {
        self.looked_up(ip_configuration_id).await;
        Ok(("fixed-vm".to_string(), "availability-set".to_string()))
    }

    async fn get_primary_interface(
        &self,
        node_name: &str,
    ) -> Result<NetworkInterfaceRecord, DomainError> {
        self.looked_up(node_name).await;
        Err(DomainError::InstanceNotFound)
    }

    async fn get_ip_by_node_name(&self, node_name: &str) -> Result<NodeAddresses, DomainError> {
        self.looked_up(node_name).await;
        Ok(NodeAddresses {
            private_ip: "10.1.0.4".to_string(),
            public_ip: None,
        })
    }

    async fn get_private_ips(&self, node_name: &str) -> Result<Vec<String>, DomainError> {
        self.looked_up(node_name).await;
        Ok(vec!["10.1.0.4".to_string()])
    }

    async fn get_zone(&self, node_name: &str) -> Result<Zone, DomainError> {
        self.looked_up(node_name).await;
        Ok(Zone {
            failure_domain: "0".to_string(),
            region: "eastus".to_string(),
        })
    }

    fn get_primary_vm_set_name(&self) -> String {
        "availability-set".to_string()
    }

    async fn get_node_vm_set_name(&self, node: &Node) -> Result<String, DomainError> {
        self.looked_up(&node.name).await;
        Ok("availability-set".to_string())
    }

    async fn get_vm_set_names(
        &self,
        _mode: &LoadBalancerMode,
        _nodes: &[Node],
    ) -> Result<Vec<String>, DomainError> {
        Ok(vec!["availability-set".to_string()])
    }

    async fn ensure_host_in_pool(
        &self,
        node: &Node,
        _target: &BackendPoolTarget,
    ) -> Result<(), DomainError> {
        self.ensured.write().await.push(node.name.clone());
        Ok(())
    }

    async fn ensure_hosts_in_pool(
        &self,
        nodes: &[Node],
        _target: &BackendPoolTarget,
    ) -> Result<(), DomainError> {
        let mut ensured = self.ensured.write().await;
        ensured.extend(nodes.iter().map(|n| n.name.clone()));
        Ok(())
    }

    async fn ensure_backend_pool_deleted(
        &self,
        _backend_pool_id: &str,
        _vm_set_name: &str,
        _ip_configuration_ids: &[String],
        _delete_from_vm_set: bool,
    ) -> Result<(), DomainError> {
        Ok(())
    }

    async fn get_node_cidr_masks_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<CidrMasks, DomainError> {
        self.looked_up(provider_id).await;
        Ok(CidrMasks::default())
    }
}
