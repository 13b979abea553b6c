use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
pub enum IpVersion {
    #[default]
    IPv4,

    IPv6,
}

impl IpVersion {
    pub fn from_ipv6(ipv6: bool) -> Self {
        if ipv6 {
            Self::IPv6
        } else {
            Self::IPv4
        }
    }
}

/// One IP configuration of an interface configuration, carrying its backend pool memberships.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct IpConfiguration {
    pub name: String,

    #[serde(default)]
    pub primary: Option<bool>,

    #[serde(default)]
    pub private_ip_address_version: IpVersion,

    /// Backend pool ids this configuration is a member of. Order is preserved.
    #[serde(default)]
    pub load_balancer_backend_address_pools: Vec<String>,
}

impl IpConfiguration {
    pub fn is_primary(&self) -> bool {
        self.primary.unwrap_or(false)
    }

    pub fn has_backend_pool(&self, backend_pool_id: &str) -> bool {
        self.load_balancer_backend_address_pools
            .iter()
            .any(|pool| pool.eq_ignore_ascii_case(backend_pool_id))
    }
}

/// Network interface configuration, shared shape between a fleet template and its instances.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct NetworkInterfaceConfiguration {
    pub name: String,

    #[serde(default)]
    pub primary: Option<bool>,

    #[serde(default)]
    pub ip_configurations: Vec<IpConfiguration>,
}

impl NetworkInterfaceConfiguration {
    pub fn is_primary(&self) -> bool {
        self.primary.unwrap_or(false)
    }
}

/// Reference from an instance to one of its materialised network interfaces.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct NetworkInterfaceReference {
    pub id: String,

    #[serde(default)]
    pub primary: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct InterfaceIpConfiguration {
    pub name: String,

    #[serde(default)]
    pub primary: Option<bool>,

    #[serde(default)]
    pub private_ip_address: Option<String>,

    #[serde(default)]
    pub private_ip_address_version: IpVersion,

    #[serde(default)]
    pub public_ip_address_id: Option<String>,
}

impl InterfaceIpConfiguration {
    pub fn is_primary(&self) -> bool {
        self.primary.unwrap_or(false)
    }
}

/// A materialised network interface as returned by the control plane.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct NetworkInterfaceRecord {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub ip_configurations: Vec<InterfaceIpConfiguration>,
}

impl NetworkInterfaceRecord {
    /// The sole IP configuration, or the one flagged primary.
    pub fn primary_ip_configuration(&self) -> Option<&InterfaceIpConfiguration> {
        if self.ip_configurations.len() == 1 {
            return self.ip_configurations.first();
        }
        self.ip_configurations.iter().find(|c| c.is_primary())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct PublicIpRecord {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub ip_address: Option<String>,
}
