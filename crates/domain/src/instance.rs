use crate::network::{NetworkInterfaceConfiguration, NetworkInterfaceReference};
use serde::{Deserialize, Serialize};

/// Status code prefix carrying the VM power state, e.g. `PowerState/running`.
pub const POWER_STATE_PREFIX: &str = "PowerState/";

/// Power state assumed when the instance view carries no power status.
pub const POWER_STATE_STOPPED: &str = "stopped";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct HardwareProfile {
    #[serde(default)]
    pub vm_size: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct InstanceStatus {
    pub code: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct InstanceView {
    #[serde(default)]
    pub statuses: Vec<InstanceStatus>,

    #[serde(default)]
    pub platform_fault_domain: Option<i32>,
}

/// Snapshot of one scale set virtual machine.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct InstanceRecord {
    /// Full resource id of the instance.
    pub id: String,

    pub instance_id: String,

    pub fleet_name: String,

    pub resource_group: String,

    #[serde(default)]
    pub computer_name: Option<String>,

    pub location: String,

    #[serde(default)]
    pub provisioning_state: Option<String>,

    #[serde(default)]
    pub zones: Vec<String>,

    #[serde(default)]
    pub sku: Option<String>,

    #[serde(default)]
    pub hardware_profile: Option<HardwareProfile>,

    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterfaceReference>,

    /// `None` while the instance is being deleted.
    #[serde(default)]
    pub network_interface_configurations: Option<Vec<NetworkInterfaceConfiguration>>,

    #[serde(default)]
    pub instance_view: Option<InstanceView>,
}

impl InstanceRecord {
    /// Lower-cased computer name, the key nodes are known by.
    pub fn node_name(&self) -> Option<String> {
        self.computer_name.as_ref().map(|name| name.to_lowercase())
    }

    /// Power state from the instance view, `stopped` when the view is missing.
    pub fn power_state(&self) -> String {
        self.instance_view
            .as_ref()
            .and_then(|view| {
                view.statuses
                    .iter()
                    .find_map(|status| status.code.strip_prefix(POWER_STATE_PREFIX))
            })
            .map(str::to_string)
            .unwrap_or_else(|| POWER_STATE_STOPPED.to_string())
    }

    pub fn platform_fault_domain(&self) -> Option<i32> {
        self.instance_view
            .as_ref()
            .and_then(|view| view.platform_fault_domain)
    }
}

/// Minimal per-instance update staged by the reconciler.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct InstanceDelta {
    pub location: String,

    pub hardware_profile: Option<HardwareProfile>,

    pub network_interface_configurations: Vec<NetworkInterfaceConfiguration>,
}
