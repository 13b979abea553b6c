use fleetlb_domain::config::LoadBalancerConfig;
use fleetlb_domain::network::IpVersion;
use fleetlb_domain::Config;

/// Scale-set engine knobs derived from [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ScaleSetSettings {
    pub resource_group: String,
    pub primary_vm_set_name: String,
    pub load_balancer: LoadBalancerConfig,
    pub ipv6_dual_stack: bool,
    pub put_vm_batch_size: usize,
}

impl ScaleSetSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            resource_group: config.provider.resource_group.clone(),
            primary_vm_set_name: config.provider.primary_scale_set_name.clone(),
            load_balancer: config.load_balancer.clone(),
            ipv6_dual_stack: config.provider.ipv6_dual_stack,
            put_vm_batch_size: config.provider.put_vm_batch_size,
        }
    }

    /// Address family selection for pool edits. `None` selects the primary IP configuration.
    pub fn ip_version(&self, ipv6: bool) -> Option<IpVersion> {
        if self.ipv6_dual_stack || ipv6 {
            Some(IpVersion::from_ipv6(ipv6))
        } else {
            None
        }
    }

    /// Whether a node's fleet must match the VM set a load balancer is scoped to.
    pub fn requires_vm_set_match(&self, vm_set_name: &str, fleet_name: &str) -> bool {
        if !self.load_balancer.is_standard() {
            return true;
        }
        if !self.load_balancer.enable_multiple_standard_load_balancers {
            return false;
        }
        let shares_primary = vm_set_name.eq_ignore_ascii_case(&self.primary_vm_set_name)
            && self.load_balancer.shares_primary_load_balancer(fleet_name);
        !shares_primary
    }

    pub fn excludes_control_plane(&self) -> bool {
        self.load_balancer.is_standard() && self.load_balancer.exclude_control_plane_nodes
    }
}
