#![allow(dead_code)]

use async_trait::async_trait;
use fleetlb_application::ports::NodeManager;
use fleetlb_domain::network::NetworkInterfaceRecord;
use fleetlb_domain::{
    BackendPoolTarget, CidrMasks, DomainError, LoadBalancerMode, Node, NodeAddresses, Zone,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    EnsureHostsInPool {
        nodes: Vec<String>,
        pool: String,
    },
    EnsureBackendPoolDeleted {
        pool: String,
        vm_set_name: String,
        ip_configuration_ids: Vec<String>,
        delete_from_vm_set: bool,
    },
    GetVmSetNames {
        mode: LoadBalancerMode,
    },
}

#[derive(Debug, Clone)]
pub struct MockNode {
    pub instance_id: String,
    pub vm_set_name: String,
    pub instance_type: String,
    pub power_status: String,
    pub provisioning_state: Option<String>,
    pub zone: Option<Zone>,
    pub addresses: NodeAddresses,
}

impl MockNode {
    pub fn running(instance_id: &str, vm_set_name: &str, private_ip: &str) -> Self {
        Self {
            instance_id: instance_id.to_string(),
            vm_set_name: vm_set_name.to_string(),
            instance_type: "Standard_D2s_v3".to_string(),
            power_status: "running".to_string(),
            provisioning_state: Some("Succeeded".to_string()),
            zone: Some(Zone {
                failure_domain: "eastus-1".to_string(),
                region: "eastus".to_string(),
            }),
            addresses: NodeAddresses {
                private_ip: private_ip.to_string(),
                public_ip: None,
            },
        }
    }
}

#[derive(Clone, Default)]
pub struct MockNodeManager {
    nodes: Arc<RwLock<HashMap<String, MockNode>>>,
    vm_set_names: Arc<RwLock<Vec<String>>>,
    failure: Arc<RwLock<Option<DomainError>>>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
}

impl MockNodeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_node(&self, name: &str, node: MockNode) {
        self.nodes.write().await.insert(name.to_string(), node);
    }

    pub async fn set_vm_set_names(&self, names: Vec<&str>) {
        *self.vm_set_names.write().await = names.into_iter().map(String::from).collect();
    }

    pub async fn fail_with(&self, error: DomainError) {
        *self.failure.write().await = Some(error);
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    async fn node(&self, name: &str) -> Result<MockNode, DomainError> {
        self.nodes
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or(DomainError::InstanceNotFound)
    }

    async fn check_failure(&self) -> Result<(), DomainError> {
        match self.failure.read().await.clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl NodeManager for MockNodeManager {
    async fn get_power_status(&self, node_name: &str) -> Result<String, DomainError> {
        Ok(self.node(node_name).await?.power_status)
    }

    async fn get_provisioning_state(
        &self,
        node_name: &str,
    ) -> Result<Option<String>, DomainError> {
        Ok(self.node(node_name).await?.provisioning_state)
    }

    async fn get_instance_id(&self, node_name: &str) -> Result<String, DomainError> {
        Ok(self.node(node_name).await?.instance_id)
    }

    async fn get_instance_type(&self, node_name: &str) -> Result<String, DomainError> {
        Ok(self.node(node_name).await?.instance_type)
    }

    async fn get_node_name_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<Option<String>, DomainError> {
        let nodes = self.nodes.read().await;
        Ok(nodes
            .iter()
            .find(|(_, node)| provider_id.ends_with(&node.instance_id))
            .map(|(name, _)| name.clone()))
    }

    async fn get_node_name_by_ip_configuration_id(
        &self,
        _ip_configuration_id: &str,
    ) -> Result<(String, String), DomainError> {
        Err(DomainError::InstanceNotFound)
    }

    async fn get_primary_interface(
        &self,
        node_name: &str,
    ) -> Result<NetworkInterfaceRecord, DomainError> {
        let node = self.node(node_name).await?;
        Ok(NetworkInterfaceRecord {
            id: format!("{}/networkInterfaces/nic", node.instance_id),
            name: "nic".to_string(),
            ..Default::default()
        })
    }

    async fn get_ip_by_node_name(&self, node_name: &str) -> Result<NodeAddresses, DomainError> {
        Ok(self.node(node_name).await?.addresses)
    }

    async fn get_private_ips(&self, node_name: &str) -> Result<Vec<String>, DomainError> {
        Ok(vec![self.node(node_name).await?.addresses.private_ip])
    }

    async fn get_zone(&self, node_name: &str) -> Result<Zone, DomainError> {
        self.node(node_name)
            .await?
            .zone
            .ok_or_else(|| DomainError::InvalidInstanceData("no zone".to_string()))
    }

    fn get_primary_vm_set_name(&self) -> String {
        "primary-vmss".to_string()
    }

    async fn get_node_vm_set_name(&self, node: &Node) -> Result<String, DomainError> {
        Ok(self.node(&node.name).await?.vm_set_name)
    }

    async fn get_vm_set_names(
        &self,
        mode: &LoadBalancerMode,
        _nodes: &[Node],
    ) -> Result<Vec<String>, DomainError> {
        self.calls
            .write()
            .await
            .push(RecordedCall::GetVmSetNames { mode: mode.clone() });
        self.check_failure().await?;
        Ok(self.vm_set_names.read().await.clone())
    }

    async fn ensure_host_in_pool(
        &self,
        node: &Node,
        target: &BackendPoolTarget,
    ) -> Result<(), DomainError> {
        self.ensure_hosts_in_pool(std::slice::from_ref(node), target)
            .await
    }

    async fn ensure_hosts_in_pool(
        &self,
        nodes: &[Node],
        target: &BackendPoolTarget,
    ) -> Result<(), DomainError> {
        self.calls
            .write()
            .await
            .push(RecordedCall::EnsureHostsInPool {
                nodes: nodes.iter().map(|n| n.name.clone()).collect(),
                pool: target.backend_pool_id.clone(),
            });
        self.check_failure().await
    }

    async fn ensure_backend_pool_deleted(
        &self,
        backend_pool_id: &str,
        vm_set_name: &str,
        ip_configuration_ids: &[String],
        delete_from_vm_set: bool,
    ) -> Result<(), DomainError> {
        self.calls
            .write()
            .await
            .push(RecordedCall::EnsureBackendPoolDeleted {
                pool: backend_pool_id.to_string(),
                vm_set_name: vm_set_name.to_string(),
                ip_configuration_ids: ip_configuration_ids.to_vec(),
                delete_from_vm_set,
            });
        self.check_failure().await
    }

    async fn get_node_cidr_masks_by_provider_id(
        &self,
        _provider_id: &str,
    ) -> Result<CidrMasks, DomainError> {
        Ok(CidrMasks::default())
    }
}
