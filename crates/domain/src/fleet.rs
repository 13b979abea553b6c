use crate::network::NetworkInterfaceConfiguration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Provisioning state reported for a scale set while it is being torn down.
pub const PROVISIONING_STATE_DEALLOCATING: &str = "Deallocating";

/// Fleet tag carrying the IPv4 node CIDR mask size.
pub const CIDR_MASK_IPV4_TAG: &str = "kubernetesNodeCIDRMaskIPV4";

/// Fleet tag carrying the IPv6 node CIDR mask size.
pub const CIDR_MASK_IPV6_TAG: &str = "kubernetesNodeCIDRMaskIPV6";

/// Snapshot of a virtual machine scale set.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FleetRecord {
    pub name: String,

    pub resource_group: String,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub provisioning_state: Option<String>,

    /// Prefix used to build instance computer names. Falls back to the fleet name when unset.
    #[serde(default)]
    pub computer_name_prefix: Option<String>,

    /// Template applied to future instances. `None` when the control plane omitted the profile.
    #[serde(default)]
    pub network_interface_configurations: Option<Vec<NetworkInterfaceConfiguration>>,

    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl FleetRecord {
    pub fn new(name: impl Into<String>, resource_group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_group: resource_group.into(),
            location: None,
            provisioning_state: None,
            computer_name_prefix: None,
            network_interface_configurations: None,
            tags: HashMap::new(),
        }
    }

    pub fn computer_name_prefix(&self) -> &str {
        self.computer_name_prefix.as_deref().unwrap_or(&self.name)
    }

    pub fn is_deallocating(&self) -> bool {
        self.provisioning_state
            .as_deref()
            .is_some_and(|state| state.eq_ignore_ascii_case(PROVISIONING_STATE_DEALLOCATING))
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Minimal template update: only the fields the control plane needs to apply a NIC change.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FleetTemplateDelta {
    pub location: Option<String>,

    pub network_interface_configurations: Vec<NetworkInterfaceConfiguration>,
}
