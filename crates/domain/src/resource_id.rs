//! Parser for control-plane resource ids and node provider ids.
//!
//! Grammar:
//!
//! ```text
//! resource-id := [ "azure://" ] "/subscriptions/" segment
//!                "/resourceGroups/" segment
//!                "/providers/" namespace
//!                "/" type "/" name *( "/" type "/" name )
//! ```
//!
//! Literal keys and resource types compare case-insensitively. Segments must be non-empty.
//! The typed views below accept only the path shapes listed on each of them.

use crate::errors::DomainError;

const PROVIDER_ID_SCHEME: &str = "azure://";
const COMPUTE_NAMESPACE: &str = "Microsoft.Compute";
const NETWORK_NAMESPACE: &str = "Microsoft.Network";
const SCALE_SETS: &str = "virtualMachineScaleSets";
const VIRTUAL_MACHINES: &str = "virtualMachines";
const NETWORK_INTERFACES: &str = "networkInterfaces";
const IP_CONFIGURATIONS: &str = "ipConfigurations";
const PUBLIC_IP_ADDRESSES: &str = "publicIPAddresses";
const LOAD_BALANCERS: &str = "loadBalancers";
const BACKEND_ADDRESS_POOLS: &str = "backendAddressPools";

/// A parsed resource id: fixed scope segments followed by (type, name) pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId<'a> {
    pub has_scheme: bool,
    pub subscription: &'a str,
    pub resource_group: &'a str,
    pub namespace: &'a str,
    pub resources: Vec<(&'a str, &'a str)>,
}

impl<'a> ResourceId<'a> {
    pub fn parse(id: &'a str) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidResourceId(id.to_string());

        let (has_scheme, path) = match id.strip_prefix(PROVIDER_ID_SCHEME) {
            Some(rest) => (true, rest),
            None => (false, id),
        };
        let path = path.strip_prefix('/').ok_or_else(invalid)?;

        let segments: Vec<&str> = path.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid());
        }
        // subscriptions/x/resourceGroups/y/providers/ns/type/name
        if segments.len() < 8 || segments.len() % 2 != 0 {
            return Err(invalid());
        }
        if !segments[0].eq_ignore_ascii_case("subscriptions")
            || !segments[2].eq_ignore_ascii_case("resourceGroups")
            || !segments[4].eq_ignore_ascii_case("providers")
        {
            return Err(invalid());
        }

        let resources = segments[6..]
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect();

        Ok(Self {
            has_scheme,
            subscription: segments[1],
            resource_group: segments[3],
            namespace: segments[5],
            resources,
        })
    }

    fn is_namespace(&self, namespace: &str) -> bool {
        self.namespace.eq_ignore_ascii_case(namespace)
    }

    /// Name of the resource at `depth` if its type matches `resource_type`.
    fn named(&self, depth: usize, resource_type: &str) -> Option<&'a str> {
        self.resources
            .get(depth)
            .filter(|(kind, _)| kind.eq_ignore_ascii_case(resource_type))
            .map(|(_, name)| *name)
    }
}

/// Any id rooted at a scale-set VM:
/// `/subscriptions/s/resourceGroups/rg/providers/Microsoft.Compute/virtualMachineScaleSets/ss/virtualMachines/i[/...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleSetVmId {
    pub resource_group: String,
    pub fleet_name: String,
    pub instance: String,
}

impl ScaleSetVmId {
    pub fn parse(id: &str) -> Result<Self, DomainError> {
        let parsed = ResourceId::parse(id).map_err(|_| not_fleet(id))?;
        if !parsed.is_namespace(COMPUTE_NAMESPACE) {
            return Err(not_fleet(id));
        }
        let fleet_name = parsed.named(0, SCALE_SETS).ok_or_else(|| not_fleet(id))?;
        let instance = parsed
            .named(1, VIRTUAL_MACHINES)
            .ok_or_else(|| not_fleet(id))?;

        Ok(Self {
            resource_group: parsed.resource_group.to_string(),
            fleet_name: fleet_name.to_string(),
            instance: instance.to_string(),
        })
    }

    /// Strict provider id of a scale-set VM node:
    /// `azure:///subscriptions/s/resourceGroups/rg/providers/Microsoft.Compute/virtualMachineScaleSets/ss/virtualMachines/<digits>`.
    pub fn parse_provider_id(provider_id: &str) -> Result<Self, DomainError> {
        let parsed = ResourceId::parse(provider_id).map_err(|_| not_fleet(provider_id))?;
        if !parsed.has_scheme || parsed.resources.len() != 2 {
            return Err(not_fleet(provider_id));
        }
        let id = Self::parse(provider_id)?;
        if id.instance.is_empty() || !id.instance.chars().all(|c| c.is_ascii_digit()) {
            return Err(not_fleet(provider_id));
        }
        Ok(id)
    }

    /// Instance id with the `<fleet>_` prefix used by some callers removed,
    /// e.g. `k8s-agentpool-36841236-vmss_1` becomes `1`.
    pub fn instance_id(&self) -> &str {
        let lower_instance = self.instance.to_lowercase();
        if lower_instance.starts_with(&self.fleet_name.to_lowercase()) {
            if let Some((_, id)) = self.instance.rsplit_once('_') {
                return id;
            }
        }
        &self.instance
    }
}

/// IP configuration of a scale-set VM NIC:
/// `.../virtualMachineScaleSets/ss/virtualMachines/i/networkInterfaces/nic[/ipConfigurations/c]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleSetNicId {
    pub resource_group: String,
    pub fleet_name: String,
    pub instance_id: String,
    pub nic_name: String,
}

impl ScaleSetNicId {
    pub fn parse(id: &str) -> Result<Self, DomainError> {
        let vm = ScaleSetVmId::parse(id)?;
        let parsed = ResourceId::parse(id).map_err(|_| not_fleet(id))?;
        let nic_name = parsed
            .named(2, NETWORK_INTERFACES)
            .ok_or_else(|| not_fleet(id))?;

        Ok(Self {
            resource_group: vm.resource_group,
            fleet_name: vm.fleet_name,
            instance_id: vm.instance,
            nic_name: nic_name.to_string(),
        })
    }
}

/// Public IP attached to a scale-set VM IP configuration:
/// `.../virtualMachines/i/networkInterfaces/nic/ipConfigurations/c/publicIPAddresses/p`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleSetPublicIpId {
    pub resource_group: String,
    pub fleet_name: String,
    pub instance_id: String,
    pub nic_name: String,
    pub ip_configuration_name: String,
    pub public_ip_name: String,
}

impl ScaleSetPublicIpId {
    pub fn parse(id: &str) -> Result<Self, DomainError> {
        let nic = ScaleSetNicId::parse(id)?;
        let parsed = ResourceId::parse(id).map_err(|_| not_fleet(id))?;
        if parsed.resources.len() != 5 {
            return Err(DomainError::InvalidResourceId(id.to_string()));
        }
        let invalid = || DomainError::InvalidResourceId(id.to_string());
        let ip_configuration_name = parsed.named(3, IP_CONFIGURATIONS).ok_or_else(invalid)?;
        let public_ip_name = parsed.named(4, PUBLIC_IP_ADDRESSES).ok_or_else(invalid)?;

        Ok(Self {
            resource_group: nic.resource_group,
            fleet_name: nic.fleet_name,
            instance_id: nic.instance_id,
            nic_name: nic.nic_name,
            ip_configuration_name: ip_configuration_name.to_string(),
            public_ip_name: public_ip_name.to_string(),
        })
    }
}

/// Load balancer backend pool:
/// `/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/loadBalancers/lb/backendAddressPools/p`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendPoolId {
    pub resource_group: String,
    pub load_balancer_name: String,
    pub pool_name: String,
}

impl BackendPoolId {
    pub fn parse(id: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidResourceId(id.to_string());
        let parsed = ResourceId::parse(id)?;
        if parsed.has_scheme || !parsed.is_namespace(NETWORK_NAMESPACE) {
            return Err(invalid());
        }
        let load_balancer_name = parsed.named(0, LOAD_BALANCERS).ok_or_else(invalid)?;
        let pool_name = parsed.named(1, BACKEND_ADDRESS_POOLS).ok_or_else(invalid)?;

        Ok(Self {
            resource_group: parsed.resource_group.to_string(),
            load_balancer_name: load_balancer_name.to_string(),
            pool_name: pool_name.to_string(),
        })
    }
}

/// Rewrites the resource group segment of `id` in lower case, keeping everything else.
pub fn lowercase_resource_group(id: &str) -> Result<String, DomainError> {
    let parsed = ResourceId::parse(id)?;
    let rg = parsed.resource_group;
    let marker = "/resourcegroups/";
    let start = id
        .to_ascii_lowercase()
        .find(marker)
        .map(|pos| pos + marker.len())
        .ok_or_else(|| DomainError::InvalidResourceId(id.to_string()))?;

    let mut converted = String::with_capacity(id.len());
    converted.push_str(&id[..start]);
    converted.push_str(&rg.to_lowercase());
    converted.push_str(&id[start + rg.len()..]);
    Ok(converted)
}

/// Last `separator`-delimited segment of `id`. Empty segments are rejected.
pub fn last_segment(id: &str, separator: char) -> Result<&str, DomainError> {
    match id.rsplit(separator).next() {
        Some(segment) if !segment.is_empty() => Ok(segment),
        _ => Err(DomainError::InvalidResourceId(id.to_string())),
    }
}

fn not_fleet(id: &str) -> DomainError {
    DomainError::NotFleetInstance(id.to_string())
}
