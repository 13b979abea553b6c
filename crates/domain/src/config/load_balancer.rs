use crate::load_balancer::LoadBalancerSku;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoadBalancerConfig {
    #[serde(default)]
    pub sku: LoadBalancerSku,

    #[serde(default)]
    pub enable_multiple_standard_load_balancers: bool,

    #[serde(default = "default_true")]
    pub exclude_control_plane_nodes: bool,

    /// VM sets that join the primary standard load balancer even when
    /// multiple standard load balancers are enabled.
    #[serde(default)]
    pub node_pool_backend_pool_sharing: Vec<String>,
}

impl LoadBalancerConfig {
    pub fn is_standard(&self) -> bool {
        self.sku == LoadBalancerSku::Standard
    }

    /// One standard load balancer fronting every VM set.
    pub fn is_single_standard(&self) -> bool {
        self.is_standard() && !self.enable_multiple_standard_load_balancers
    }

    pub fn shares_primary_load_balancer(&self, vm_set_name: &str) -> bool {
        self.node_pool_backend_pool_sharing
            .iter()
            .any(|name| name.eq_ignore_ascii_case(vm_set_name))
    }
}

impl Default for LoadBalancerConfig {
    fn default() -> Self {
        Self {
            sku: LoadBalancerSku::default(),
            enable_multiple_standard_load_balancers: false,
            exclude_control_plane_nodes: true,
            node_pool_backend_pool_sharing: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}
