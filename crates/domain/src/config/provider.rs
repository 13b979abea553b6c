use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub subscription_id: String,

    /// Resource group the cluster's scale sets live in.
    #[serde(default)]
    pub resource_group: String,

    /// Further resource groups scanned for scale sets.
    #[serde(default)]
    pub extra_resource_groups: Vec<String>,

    #[serde(default)]
    pub primary_scale_set_name: String,

    /// Instances per batched update call. 0 sends each group in one call.
    #[serde(default)]
    pub put_vm_batch_size: usize,

    #[serde(default = "default_remote_call_timeout_secs")]
    pub remote_call_timeout_secs: u64,

    #[serde(default)]
    pub ipv6_dual_stack: bool,
}

impl ProviderConfig {
    pub fn remote_call_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_call_timeout_secs)
    }

    /// Every resource group scanned for scale sets, primary first, without duplicates.
    pub fn resource_groups(&self) -> Vec<String> {
        let mut groups = vec![self.resource_group.clone()];
        for group in &self.extra_resource_groups {
            if !groups.iter().any(|g| g.eq_ignore_ascii_case(group)) {
                groups.push(group.clone());
            }
        }
        groups
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            subscription_id: String::new(),
            resource_group: String::new(),
            extra_resource_groups: Vec::new(),
            primary_scale_set_name: String::new(),
            put_vm_batch_size: 0,
            remote_call_timeout_secs: default_remote_call_timeout_secs(),
            ipv6_dual_stack: false,
        }
    }
}

fn default_remote_call_timeout_secs() -> u64 {
    30
}
