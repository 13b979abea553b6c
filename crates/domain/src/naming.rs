//! Scale-set machine naming.
//!
//! A scale-set computer name is the fleet's computer-name prefix followed by the instance id
//! rendered in base 36 and padded to exactly six characters, e.g. `aks-pool1-vmss00000a`
//! is instance `10` of a fleet with prefix `aks-pool1-vmss`.

use crate::errors::DomainError;

/// Length of the base-36 instance suffix of a scale-set computer name.
pub const INSTANCE_SUFFIX_LEN: usize = 6;

/// Decodes the instance id from the trailing six base-36 characters of `node_name`.
pub fn instance_id_from_node_name(node_name: &str) -> Result<String, DomainError> {
    let suffix = split_instance_suffix(node_name)?.1;
    if !suffix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(DomainError::NotFleetInstance(node_name.to_string()));
    }

    u64::from_str_radix(suffix, 36)
        .map(|id| id.to_string())
        .map_err(|_| DomainError::NotFleetInstance(node_name.to_string()))
}

/// The part of `node_name` in front of the instance suffix.
pub fn computer_name_prefix(node_name: &str) -> Result<&str, DomainError> {
    split_instance_suffix(node_name).map(|(prefix, _)| prefix)
}

fn split_instance_suffix(node_name: &str) -> Result<(&str, &str), DomainError> {
    let len = node_name.len();
    if len < INSTANCE_SUFFIX_LEN {
        return Err(DomainError::NotFleetInstance(node_name.to_string()));
    }

    let split = len - INSTANCE_SUFFIX_LEN;
    if !node_name.is_char_boundary(split) {
        return Err(DomainError::NotFleetInstance(node_name.to_string()));
    }
    Ok(node_name.split_at(split))
}
