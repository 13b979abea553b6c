//! Compute client backed by an in-process inventory snapshot.
//!
//! Used by the command line tool to reconcile against a JSON export of the control plane,
//! and by tests as a programmable fake. Lookups match names case-insensitively.

use async_trait::async_trait;
use fleetlb_application::ports::ComputeClient;
use fleetlb_domain::fleet::{FleetRecord, FleetTemplateDelta};
use fleetlb_domain::instance::{InstanceDelta, InstanceRecord};
use fleetlb_domain::network::{NetworkInterfaceRecord, PublicIpRecord};
use fleetlb_domain::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Materialised NIC of one instance.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SnapshotInterface {
    pub resource_group: String,
    pub fleet_name: String,
    pub instance_id: String,
    pub interface: NetworkInterfaceRecord,
}

/// Public IP attached to one IP configuration of an instance NIC.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SnapshotPublicIp {
    pub resource_group: String,
    pub fleet_name: String,
    pub instance_id: String,
    pub nic_name: String,
    pub ip_configuration_name: String,
    pub record: PublicIpRecord,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct InventorySnapshot {
    #[serde(default)]
    pub resource_groups: Vec<String>,

    #[serde(default)]
    pub fleets: Vec<FleetRecord>,

    #[serde(default)]
    pub instances: Vec<InstanceRecord>,

    #[serde(default)]
    pub network_interfaces: Vec<SnapshotInterface>,

    #[serde(default)]
    pub public_ips: Vec<SnapshotPublicIp>,
}

impl InventorySnapshot {
    pub fn from_json(contents: &str) -> Result<Self, DomainError> {
        serde_json::from_str(contents)
            .map_err(|e| DomainError::InvalidInstanceData(format!("inventory snapshot: {}", e)))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DomainError::ConfigError(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DomainError> {
        let path = path.as_ref();
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| DomainError::InvalidInstanceData(e.to_string()))?;
        std::fs::write(path, contents).map_err(|e| {
            DomainError::ConfigError(format!("failed to write {}: {}", path.display(), e))
        })
    }
}

pub struct InMemoryComputeClient {
    state: RwLock<InventorySnapshot>,
}

fn same(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

fn not_found(kind: &str, name: &str) -> DomainError {
    DomainError::NotFound(format!("{} {}", kind, name))
}

impl InventorySnapshot {
    fn has_resource_group(&self, resource_group: &str) -> bool {
        self.resource_groups.iter().any(|rg| same(rg, resource_group))
    }

    fn fleet_mut(
        &mut self,
        resource_group: &str,
        fleet_name: &str,
    ) -> Result<&mut FleetRecord, DomainError> {
        self.fleets
            .iter_mut()
            .find(|f| same(&f.resource_group, resource_group) && same(&f.name, fleet_name))
            .ok_or_else(|| not_found("scale set", fleet_name))
    }

    fn has_fleet(&self, resource_group: &str, fleet_name: &str) -> bool {
        self.fleets
            .iter()
            .any(|f| same(&f.resource_group, resource_group) && same(&f.name, fleet_name))
    }
}

impl InMemoryComputeClient {
    pub fn new(snapshot: InventorySnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    /// Current state, including every applied update.
    pub async fn snapshot(&self) -> InventorySnapshot {
        self.state.read().await.clone()
    }

    pub async fn upsert_instance(&self, instance: InstanceRecord) {
        let mut state = self.state.write().await;
        state.instances.retain(|i| {
            !(same(&i.resource_group, &instance.resource_group)
                && same(&i.fleet_name, &instance.fleet_name)
                && same(&i.instance_id, &instance.instance_id))
        });
        state.instances.push(instance);
    }

    pub async fn remove_instance(&self, resource_group: &str, fleet_name: &str, instance_id: &str) {
        self.state.write().await.instances.retain(|i| {
            !(same(&i.resource_group, resource_group)
                && same(&i.fleet_name, fleet_name)
                && same(&i.instance_id, instance_id))
        });
    }

    pub async fn upsert_fleet(&self, fleet: FleetRecord) {
        let mut state = self.state.write().await;
        state
            .fleets
            .retain(|f| !(same(&f.resource_group, &fleet.resource_group) && same(&f.name, &fleet.name)));
        state.fleets.push(fleet);
    }
}

#[async_trait]
impl ComputeClient for InMemoryComputeClient {
    async fn list_fleets(&self, resource_group: &str) -> Result<Vec<FleetRecord>, DomainError> {
        let state = self.state.read().await;
        if !state.has_resource_group(resource_group) {
            return Err(not_found("resource group", resource_group));
        }
        Ok(state
            .fleets
            .iter()
            .filter(|f| same(&f.resource_group, resource_group))
            .cloned()
            .collect())
    }

    async fn list_instances(
        &self,
        resource_group: &str,
        fleet_name: &str,
        with_instance_view: bool,
    ) -> Result<Vec<InstanceRecord>, DomainError> {
        let state = self.state.read().await;
        if !state.has_fleet(resource_group, fleet_name) {
            return Err(not_found("scale set", fleet_name));
        }
        Ok(state
            .instances
            .iter()
            .filter(|i| same(&i.resource_group, resource_group) && same(&i.fleet_name, fleet_name))
            .cloned()
            .map(|mut i| {
                if !with_instance_view {
                    i.instance_view = None;
                }
                i
            })
            .collect())
    }

    async fn update_instances_batch(
        &self,
        resource_group: &str,
        fleet_name: &str,
        deltas: HashMap<String, InstanceDelta>,
        operation: &str,
        batch_size: usize,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if !state.has_fleet(resource_group, fleet_name) {
            return Err(not_found("scale set", fleet_name));
        }

        let in_group = |i: &InstanceRecord, id: &str| {
            same(&i.resource_group, resource_group)
                && same(&i.fleet_name, fleet_name)
                && same(&i.instance_id, id)
        };
        if let Some(missing) = deltas
            .keys()
            .find(|id| !state.instances.iter().any(|i| in_group(i, id)))
        {
            return Err(not_found("instance", missing));
        }

        let batches = match batch_size {
            0 => 1,
            size => deltas.len().div_ceil(size),
        };
        for (id, delta) in deltas.iter() {
            if let Some(instance) = state.instances.iter_mut().find(|i| in_group(i, id)) {
                instance.network_interface_configurations =
                    Some(delta.network_interface_configurations.clone());
                if delta.hardware_profile.is_some() {
                    instance.hardware_profile = delta.hardware_profile.clone();
                }
            }
        }

        info!(
            resource_group = %resource_group,
            fleet = %fleet_name,
            operation = %operation,
            instances = deltas.len(),
            batches = batches,
            "Applied instance updates"
        );
        Ok(())
    }

    async fn update_fleet_template(
        &self,
        resource_group: &str,
        fleet_name: &str,
        delta: FleetTemplateDelta,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let fleet = state.fleet_mut(resource_group, fleet_name)?;
        fleet.network_interface_configurations = Some(delta.network_interface_configurations);
        if delta.location.is_some() {
            fleet.location = delta.location;
        }
        debug!(resource_group = %resource_group, fleet = %fleet_name, "Applied template update");
        Ok(())
    }

    async fn get_network_interface(
        &self,
        resource_group: &str,
        fleet_name: &str,
        instance_id: &str,
        nic_name: &str,
    ) -> Result<NetworkInterfaceRecord, DomainError> {
        let state = self.state.read().await;
        state
            .network_interfaces
            .iter()
            .find(|n| {
                same(&n.resource_group, resource_group)
                    && same(&n.fleet_name, fleet_name)
                    && same(&n.instance_id, instance_id)
                    && same(&n.interface.name, nic_name)
            })
            .map(|n| n.interface.clone())
            .ok_or_else(|| not_found("network interface", nic_name))
    }

    async fn get_public_ip(
        &self,
        resource_group: &str,
        fleet_name: &str,
        instance_id: &str,
        nic_name: &str,
        ip_configuration_name: &str,
        public_ip_name: &str,
    ) -> Result<PublicIpRecord, DomainError> {
        let state = self.state.read().await;
        state
            .public_ips
            .iter()
            .find(|p| {
                same(&p.resource_group, resource_group)
                    && same(&p.fleet_name, fleet_name)
                    && same(&p.instance_id, instance_id)
                    && same(&p.nic_name, nic_name)
                    && same(&p.ip_configuration_name, ip_configuration_name)
                    && same(&p.record.name, public_ip_name)
            })
            .map(|p| p.record.clone())
            .ok_or_else(|| not_found("public ip", public_ip_name))
    }
}
