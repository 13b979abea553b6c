use crate::ports::NodeManager;
use fleetlb_domain::{DomainError, Node, NodeAddresses, Zone};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const PROVIDER_ID_SCHEME: &str = "azure://";

/// Everything the control loop can learn about one node.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NodeDescription {
    pub name: String,
    pub instance_id: String,
    pub vm_set_name: String,
    pub instance_type: String,
    pub power_status: String,
    pub provisioning_state: Option<String>,
    pub zone: Option<Zone>,
    pub addresses: NodeAddresses,
}

pub struct DescribeNodeUseCase {
    node_manager: Arc<dyn NodeManager>,
}

impl DescribeNodeUseCase {
    pub fn new(node_manager: Arc<dyn NodeManager>) -> Self {
        Self { node_manager }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, node_name: &str) -> Result<NodeDescription, DomainError> {
        let instance_id = self.node_manager.get_instance_id(node_name).await?;
        let power_status = self.node_manager.get_power_status(node_name).await?;
        let provisioning_state = self.node_manager.get_provisioning_state(node_name).await?;
        let instance_type = self.node_manager.get_instance_type(node_name).await?;
        let addresses = self.node_manager.get_ip_by_node_name(node_name).await?;
        let vm_set_name = self
            .node_manager
            .get_node_vm_set_name(&Node::new(node_name).with_provider_id(provider_id(&instance_id)))
            .await?;

        // Instances without zone or fault domain information are still describable.
        let zone = match self.node_manager.get_zone(node_name).await {
            Ok(zone) => Some(zone),
            Err(DomainError::InstanceNotFound) => return Err(DomainError::InstanceNotFound),
            Err(e) => {
                warn!(node = %node_name, error = %e, "Zone unavailable");
                None
            }
        };

        debug!(node = %node_name, vm_set = %vm_set_name, "Node described");

        Ok(NodeDescription {
            name: node_name.to_string(),
            instance_id,
            vm_set_name,
            instance_type,
            power_status,
            provisioning_state,
            zone,
            addresses,
        })
    }
}

fn provider_id(instance_id: &str) -> String {
    format!("{PROVIDER_ID_SCHEME}{instance_id}")
}
