#![allow(dead_code)]
use super::builders::RESOURCE_GROUP;
use super::mock_compute_client::CountingComputeClient;
use super::mock_fixed_set::RecordingFixedSet;
use fleetlb_application::ports::{ComputeClient, NodeManager};
use fleetlb_domain::config::{CacheConfig, LoadBalancerConfig};
use fleetlb_domain::LoadBalancerSku;
use fleetlb_infrastructure::scale_set::{ScaleSetNodeManager, ScaleSetSettings};
use std::sync::Arc;

pub const PRIMARY_VM_SET: &str = "vmss-a";

/// One standard load balancer shared by every scale set.
pub fn single_standard_settings() -> ScaleSetSettings {
    ScaleSetSettings {
        resource_group: RESOURCE_GROUP.to_string(),
        primary_vm_set_name: PRIMARY_VM_SET.to_string(),
        load_balancer: LoadBalancerConfig::default(),
        ipv6_dual_stack: false,
        put_vm_batch_size: 0,
    }
}

pub fn multiple_standard_settings() -> ScaleSetSettings {
    let mut settings = single_standard_settings();
    settings.load_balancer.enable_multiple_standard_load_balancers = true;
    settings
}

pub fn basic_settings() -> ScaleSetSettings {
    let mut settings = single_standard_settings();
    settings.load_balancer.sku = LoadBalancerSku::Basic;
    settings
}

pub struct Harness {
    pub client: Arc<CountingComputeClient>,
    pub fixed_set: Arc<RecordingFixedSet>,
    pub manager: Arc<ScaleSetNodeManager>,
}

impl Harness {
    pub fn new(client: Arc<CountingComputeClient>, settings: ScaleSetSettings) -> Self {
        let fixed_set = Arc::new(RecordingFixedSet::new());
        let manager = Arc::new(ScaleSetNodeManager::new(
            Arc::clone(&client) as Arc<dyn ComputeClient>,
            Arc::clone(&fixed_set) as Arc<dyn NodeManager>,
            vec![RESOURCE_GROUP.to_string()],
            &CacheConfig::default(),
            settings,
        ));

        Self {
            client,
            fixed_set,
            manager,
        }
    }
}
