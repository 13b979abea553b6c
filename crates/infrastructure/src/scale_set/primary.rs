//! Backend pool edits on network interface configuration lists.
//!
//! Instances and fleet templates share the same configuration shape, so every edit here
//! works on a borrowed list and returns a fresh copy. Nothing is mutated in place.

use fleetlb_domain::load_balancer::INTERNAL_LOAD_BALANCER_SUFFIX;
use fleetlb_domain::network::{IpConfiguration, IpVersion, NetworkInterfaceConfiguration};
use fleetlb_domain::resource_id::BackendPoolId;
use fleetlb_domain::DomainError;

/// Pool name suffix marking the IPv6 pool of a dual-stack load balancer.
const IPV6_POOL_SUFFIX: &str = "-ipv6";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEdit {
    /// The whole configuration list with the edit applied.
    Changed(Vec<NetworkInterfaceConfiguration>),

    AlreadySatisfied,

    /// The IP configuration already belongs to a pool of the named load balancer.
    OtherLoadBalancer(String),
}

/// The sole configuration, or the one flagged primary.
pub fn primary_interface_index(
    configs: &[NetworkInterfaceConfiguration],
    owner: &str,
) -> Result<usize, DomainError> {
    if configs.len() == 1 {
        return Ok(0);
    }
    configs
        .iter()
        .position(NetworkInterfaceConfiguration::is_primary)
        .ok_or_else(|| {
            DomainError::AmbiguousConfiguration(format!(
                "failed to find a primary nic for {}",
                owner
            ))
        })
}

/// IP configuration carrying pool membership. With `ip_version` set the configuration is
/// picked by address family, otherwise the sole or primary one.
pub fn ip_configuration_index(
    config: &NetworkInterfaceConfiguration,
    ip_version: Option<IpVersion>,
    owner: &str,
) -> Result<usize, DomainError> {
    let ip_configs = &config.ip_configurations;
    let found = match ip_version {
        Some(version) => ip_configs
            .iter()
            .position(|c| c.private_ip_address_version == version),
        None if ip_configs.len() == 1 => Some(0),
        None => ip_configs.iter().position(IpConfiguration::is_primary),
    };

    found.ok_or_else(|| {
        DomainError::AmbiguousConfiguration(format!(
            "failed to find a primary IP configuration for {}",
            owner
        ))
    })
}

/// Load balancer name owning a pool, without the internal suffix.
pub fn load_balancer_name(backend_pool_id: &str) -> Result<String, DomainError> {
    let pool = BackendPoolId::parse(backend_pool_id)?;
    let name = pool.load_balancer_name;
    let trimmed_len = if name.to_ascii_lowercase().ends_with(INTERNAL_LOAD_BALANCER_SUFFIX) {
        name.len() - INTERNAL_LOAD_BALANCER_SUFFIX.len()
    } else {
        name.len()
    };
    Ok(name[..trimmed_len].to_string())
}

/// `Ok(None)` when every existing pool sits on the same load balancer as `new_pool_id`,
/// otherwise the first differing load balancer name.
pub fn conflicting_load_balancer(
    new_pool_id: &str,
    existing_pool_ids: &[String],
) -> Result<Option<String>, DomainError> {
    let target = load_balancer_name(new_pool_id)?;
    for existing in existing_pool_ids {
        let name = load_balancer_name(existing)?;
        if !name.eq_ignore_ascii_case(&target) {
            return Ok(Some(name));
        }
    }
    Ok(None)
}

pub fn is_ipv6_backend_pool(backend_pool_id: &str) -> bool {
    backend_pool_id
        .to_ascii_lowercase()
        .ends_with(IPV6_POOL_SUFFIX)
}

/// Appends `pool_id` to the selected IP configuration of the primary interface.
///
/// With `check_load_balancer` set, a configuration already in a pool of another load
/// balancer is left alone.
pub fn add_backend_pool(
    configs: &[NetworkInterfaceConfiguration],
    pool_id: &str,
    ip_version: Option<IpVersion>,
    check_load_balancer: bool,
    owner: &str,
) -> Result<PoolEdit, DomainError> {
    let nic = primary_interface_index(configs, owner)?;
    let ip = ip_configuration_index(&configs[nic], ip_version, owner)?;
    let pools = &configs[nic].ip_configurations[ip].load_balancer_backend_address_pools;

    if pools.iter().any(|p| p.eq_ignore_ascii_case(pool_id)) {
        return Ok(PoolEdit::AlreadySatisfied);
    }

    if check_load_balancer && !pools.is_empty() {
        if let Some(other) = conflicting_load_balancer(pool_id, pools)? {
            return Ok(PoolEdit::OtherLoadBalancer(other));
        }
    }

    let mut updated = configs.to_vec();
    updated[nic].ip_configurations[ip]
        .load_balancer_backend_address_pools
        .push(pool_id.to_string());
    Ok(PoolEdit::Changed(updated))
}

/// Removes every case-insensitive occurrence of `pool_id` from the selected IP configuration.
pub fn remove_backend_pool(
    configs: &[NetworkInterfaceConfiguration],
    pool_id: &str,
    ip_version: Option<IpVersion>,
    owner: &str,
) -> Result<PoolEdit, DomainError> {
    let nic = primary_interface_index(configs, owner)?;
    let ip = ip_configuration_index(&configs[nic], ip_version, owner)?;

    if !configs[nic].ip_configurations[ip].has_backend_pool(pool_id) {
        return Ok(PoolEdit::AlreadySatisfied);
    }

    let mut updated = configs.to_vec();
    updated[nic].ip_configurations[ip]
        .load_balancer_backend_address_pools
        .retain(|p| !p.eq_ignore_ascii_case(pool_id));
    Ok(PoolEdit::Changed(updated))
}
