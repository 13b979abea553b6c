use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Label that removes a node from external load balancer backends.
pub const EXCLUDE_FROM_LOAD_BALANCER_LABEL: &str =
    "node.kubernetes.io/exclude-from-external-load-balancers";

const CONTROL_PLANE_LABELS: [&str; 2] = [
    "node-role.kubernetes.io/control-plane",
    "node-role.kubernetes.io/master",
];

/// A cluster node as seen by the control loop.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct Node {
    pub name: String,

    #[serde(default)]
    pub provider_id: String,

    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider_id: String::new(),
            labels: HashMap::new(),
        }
    }

    pub fn with_provider_id(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = provider_id.into();
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn is_control_plane(&self) -> bool {
        CONTROL_PLANE_LABELS
            .iter()
            .any(|label| self.labels.contains_key(*label))
    }

    pub fn is_excluded_from_load_balancer(&self) -> bool {
        self.labels.contains_key(EXCLUDE_FROM_LOAD_BALANCER_LABEL)
    }
}

/// Coordinates of the fleet owning a node. Derived per lookup, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeIdentity {
    pub node_name: String,
    pub resource_group: String,
    pub fleet_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Zone {
    pub failure_domain: String,
    pub region: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct NodeAddresses {
    pub private_ip: String,
    pub public_ip: Option<String>,
}

/// Node CIDR mask sizes configured on a fleet through tags.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct CidrMasks {
    pub ipv4: Option<u8>,
    pub ipv6: Option<u8>,
}
