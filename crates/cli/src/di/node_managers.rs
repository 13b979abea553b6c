use fleetlb_application::ports::{ComputeClient, NodeManager};
use fleetlb_domain::Config;
use fleetlb_infrastructure::{
    InMemoryComputeClient, InventorySnapshot, ScaleSetNodeManager, TimeoutComputeClient,
    UnmanagedFixedSet,
};
use std::sync::Arc;
use tracing::info;

pub struct NodeManagers {
    pub client: Arc<InMemoryComputeClient>,
    pub node_manager: Arc<dyn NodeManager>,
}

impl NodeManagers {
    pub fn new(config: &Config, inventory: InventorySnapshot) -> Self {
        info!(
            fleets = inventory.fleets.len(),
            instances = inventory.instances.len(),
            "Loaded inventory snapshot"
        );

        let client = Arc::new(InMemoryComputeClient::new(inventory));
        let bounded: Arc<dyn ComputeClient> = Arc::new(TimeoutComputeClient::new(
            Arc::clone(&client) as Arc<dyn ComputeClient>,
            config.provider.remote_call_timeout(),
        ));
        let fixed_set: Arc<dyn NodeManager> = Arc::new(UnmanagedFixedSet::new());

        Self {
            client,
            node_manager: Arc::new(ScaleSetNodeManager::from_config(bounded, fixed_set, config)),
        }
    }
}
