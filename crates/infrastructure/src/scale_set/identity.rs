use super::inventory::{
    instance_inventory_key, FleetInventory, FleetInventoryLoader, InstanceEntry,
    InstanceInventory, InstanceInventoryLoader, FLEET_INVENTORY_KEY,
};
use crate::cache::{CacheLoader, CacheReadType, KeyedLock, TimedCache};
use dashmap::DashMap;
use fleetlb_application::ports::ComputeClient;
use fleetlb_domain::fleet::FleetRecord;
use fleetlb_domain::instance::InstanceRecord;
use fleetlb_domain::naming;
use fleetlb_domain::{DomainError, NodeIdentity};
use rustc_hash::FxBuildHasher;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Maps node names to fleet coordinates and instance records through the inventory caches.
///
/// Misses are answered with at most one forced refresh of the relevant inventory before a
/// node is reported as [`DomainError::InstanceNotFound`].
pub struct IdentityResolver {
    fleets: TimedCache<FleetInventory>,
    instances: DashMap<String, Arc<TimedCache<InstanceInventory>>, FxBuildHasher>,
    instance_loader: Arc<dyn CacheLoader<InstanceInventory>>,
    instance_ttl: Duration,
    refresh_lock: KeyedLock,
}

impl IdentityResolver {
    pub fn new(
        client: Arc<dyn ComputeClient>,
        resource_groups: Vec<String>,
        fleet_ttl: Duration,
        instance_ttl: Duration,
    ) -> Self {
        let fleet_loader: Arc<dyn CacheLoader<FleetInventory>> = Arc::new(
            FleetInventoryLoader::new(Arc::clone(&client), resource_groups),
        );

        Self {
            fleets: TimedCache::new("fleets", fleet_ttl, fleet_loader),
            instances: DashMap::with_hasher(FxBuildHasher),
            instance_loader: Arc::new(InstanceInventoryLoader::new(client)),
            instance_ttl,
            refresh_lock: KeyedLock::new(),
        }
    }

    pub async fn fleet_inventory(
        &self,
        read_type: CacheReadType,
    ) -> Result<Arc<FleetInventory>, DomainError> {
        self.fleets.get(FLEET_INVENTORY_KEY, read_type).await
    }

    /// Finds the fleet owning `node_name` from the computer-name prefix.
    pub async fn resolve_fleet(
        &self,
        node_name: &str,
        read_type: CacheReadType,
    ) -> Result<NodeIdentity, DomainError> {
        naming::instance_id_from_node_name(node_name)?;
        let prefix = naming::computer_name_prefix(node_name)?;

        let inventory = self.fleet_inventory(read_type).await?;
        if let Some(fleet) = inventory.find_by_computer_name_prefix(prefix) {
            return Ok(identity_for(node_name, fleet));
        }

        debug!(node = %node_name, "Fleet not in inventory, refreshing");
        let inventory = self.fleet_inventory(CacheReadType::ForceRefresh).await?;
        inventory
            .find_by_computer_name_prefix(prefix)
            .map(|fleet| identity_for(node_name, fleet))
            .ok_or(DomainError::InstanceNotFound)
    }

    /// The instance record of an already resolved node.
    pub async fn resolve_instance(
        &self,
        identity: &NodeIdentity,
        read_type: CacheReadType,
    ) -> Result<Arc<InstanceRecord>, DomainError> {
        let key = instance_inventory_key(&identity.resource_group, &identity.fleet_name);
        let cache = self.instance_cache(&key);
        let lookup = |inventory: &InstanceInventory| {
            inventory
                .by_node_name(&identity.node_name)
                .and_then(|entry| entry.record.clone())
        };

        if let Some(record) = lookup(&*cache.get(&key, read_type).await?) {
            return Ok(record);
        }

        let _guard = self.refresh_lock.lock(&key).await;
        if let Some(record) = lookup(&*cache.get(&key, read_type).await?) {
            return Ok(record);
        }

        debug!(node = %identity.node_name, key = %key, "Instance not in inventory, refreshing");
        lookup(&*cache.get(&key, CacheReadType::ForceRefresh).await?)
            .ok_or(DomainError::InstanceNotFound)
    }

    pub async fn resolve_instance_by_node_name(
        &self,
        node_name: &str,
        read_type: CacheReadType,
    ) -> Result<(NodeIdentity, Arc<InstanceRecord>), DomainError> {
        let identity = self.resolve_fleet(node_name, read_type).await?;
        let record = self.resolve_instance(&identity, read_type).await?;
        Ok((identity, record))
    }

    pub async fn resolve_instance_by_coordinates(
        &self,
        resource_group: &str,
        fleet_name: &str,
        instance_id: &str,
        read_type: CacheReadType,
    ) -> Result<Arc<InstanceRecord>, DomainError> {
        let key = instance_inventory_key(resource_group, fleet_name);
        let cache = self.instance_cache(&key);
        let lookup = |inventory: &InstanceInventory| -> Option<InstanceEntry> {
            inventory.by_instance_id(instance_id).cloned()
        };

        let mut entry = lookup(&*cache.get(&key, read_type).await?);
        if entry.is_none() {
            debug!(key = %key, instance_id = %instance_id, "Instance not in inventory, refreshing");
            entry = lookup(&*cache.get(&key, CacheReadType::ForceRefresh).await?);
        }

        match entry {
            Some(InstanceEntry {
                record: Some(record),
                ..
            }) => Ok(record),
            Some(_) => {
                debug!(key = %key, instance_id = %instance_id, "Instance is a tombstone, rereading");
                lookup(&*cache.get(&key, CacheReadType::Default).await?)
                    .and_then(|entry| entry.record)
                    .ok_or(DomainError::InstanceNotFound)
            }
            None => Err(DomainError::InstanceNotFound),
        }
    }

    /// Fleet by name. A miss drops the fleet inventory and reads it once more.
    pub async fn get_fleet(&self, fleet_name: &str) -> Result<Arc<FleetRecord>, DomainError> {
        let inventory = self.fleet_inventory(CacheReadType::Default).await?;
        if let Some(fleet) = inventory.get(fleet_name) {
            return Ok(Arc::clone(fleet));
        }

        debug!(fleet = %fleet_name, "Fleet not in inventory, refreshing");
        self.fleets.delete(FLEET_INVENTORY_KEY);
        let inventory = self.fleet_inventory(CacheReadType::Default).await?;
        inventory
            .get(fleet_name)
            .cloned()
            .ok_or(DomainError::InstanceNotFound)
    }

    /// Drops the instance inventory holding `node_name`. The fleet is looked up in the
    /// cache only; unknown nodes are ignored.
    pub async fn invalidate_node(&self, node_name: &str) {
        match self.resolve_fleet_cached(node_name).await {
            Some(identity) => {
                self.invalidate_instances(&identity.resource_group, &identity.fleet_name);
            }
            None => debug!(node = %node_name, "No cached fleet for node, nothing to invalidate"),
        }
    }

    pub fn invalidate_instances(&self, resource_group: &str, fleet_name: &str) {
        let key = instance_inventory_key(resource_group, fleet_name);
        if let Some(cache) = self.instances.get(&key) {
            cache.delete(&key);
        }
    }

    pub fn invalidate_fleets(&self) {
        info!("Invalidating fleet inventory");
        self.fleets.delete(FLEET_INVENTORY_KEY);
    }

    async fn resolve_fleet_cached(&self, node_name: &str) -> Option<NodeIdentity> {
        let prefix = naming::computer_name_prefix(node_name).ok()?;
        let inventory = self.fleet_inventory(CacheReadType::Unsafe).await.ok()?;
        inventory
            .find_by_computer_name_prefix(prefix)
            .map(|fleet| identity_for(node_name, fleet))
    }

    fn instance_cache(&self, key: &str) -> Arc<TimedCache<InstanceInventory>> {
        self.instances
            .entry(key.to_string())
            .or_insert_with(|| {
                Arc::new(TimedCache::new(
                    "instances",
                    self.instance_ttl,
                    Arc::clone(&self.instance_loader),
                ))
            })
            .clone()
    }
}

fn identity_for(node_name: &str, fleet: &FleetRecord) -> NodeIdentity {
    NodeIdentity {
        node_name: node_name.to_lowercase(),
        resource_group: fleet.resource_group.clone(),
        fleet_name: fleet.name.clone(),
    }
}
