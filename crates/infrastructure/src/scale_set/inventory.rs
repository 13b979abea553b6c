use crate::cache::CacheLoader;
use async_trait::async_trait;
use fleetlb_application::ports::ComputeClient;
use fleetlb_domain::fleet::FleetRecord;
use fleetlb_domain::instance::InstanceRecord;
use fleetlb_domain::DomainError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Cache key of the single entry aggregating every fleet.
pub const FLEET_INVENTORY_KEY: &str = "fleets";

/// How long an instance missing from the latest listing is remembered as gone.
pub const TOMBSTONE_TTL: Duration = Duration::from_secs(15 * 60);

pub fn instance_inventory_key(resource_group: &str, fleet_name: &str) -> String {
    format!("{}/{}", resource_group, fleet_name).to_lowercase()
}

/// Every fleet across the scanned resource groups, keyed by lower-cased name.
#[derive(Debug, Default)]
pub struct FleetInventory {
    fleets: HashMap<String, Arc<FleetRecord>>,
}

impl FleetInventory {
    pub fn get(&self, name: &str) -> Option<&Arc<FleetRecord>> {
        self.fleets.get(&name.to_lowercase())
    }

    /// The fleet whose instance computer names start with `prefix`.
    pub fn find_by_computer_name_prefix(&self, prefix: &str) -> Option<&Arc<FleetRecord>> {
        self.fleets
            .values()
            .find(|fleet| fleet.computer_name_prefix().eq_ignore_ascii_case(prefix))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<FleetRecord>> {
        self.fleets.values()
    }

    pub fn len(&self) -> usize {
        self.fleets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fleets.is_empty()
    }
}

impl FromIterator<FleetRecord> for FleetInventory {
    fn from_iter<I: IntoIterator<Item = FleetRecord>>(iter: I) -> Self {
        let fleets = iter
            .into_iter()
            .map(|fleet| (fleet.name.to_lowercase(), Arc::new(fleet)))
            .collect();
        Self { fleets }
    }
}

pub struct FleetInventoryLoader {
    client: Arc<dyn ComputeClient>,
    resource_groups: Vec<String>,
}

impl FleetInventoryLoader {
    pub fn new(client: Arc<dyn ComputeClient>, resource_groups: Vec<String>) -> Self {
        Self {
            client,
            resource_groups,
        }
    }
}

#[async_trait]
impl CacheLoader<FleetInventory> for FleetInventoryLoader {
    async fn load(
        &self,
        _key: &str,
        _previous: Option<Arc<FleetInventory>>,
    ) -> Result<FleetInventory, DomainError> {
        let mut fleets = Vec::new();

        for resource_group in &self.resource_groups {
            match self.client.list_fleets(resource_group).await {
                Ok(listed) => fleets.extend(listed.into_iter().filter(|fleet| {
                    if fleet.name.is_empty() {
                        warn!(resource_group = %resource_group, "Skipping scale set without a name");
                    }
                    !fleet.name.is_empty()
                })),
                Err(DomainError::NotFound(_)) => {
                    warn!(resource_group = %resource_group, "Skipping missing resource group");
                }
                Err(e) => return Err(e),
            }
        }

        debug!(fleets = fleets.len(), "Fleet inventory loaded");
        Ok(fleets.into_iter().collect())
    }
}

/// One instance of a fleet. `record` is `None` for a tombstone: an instance that vanished
/// from the latest listing.
#[derive(Debug, Clone)]
pub struct InstanceEntry {
    pub resource_group: String,
    pub fleet_name: String,
    pub instance_id: String,
    pub record: Option<Arc<InstanceRecord>>,
    pub last_update: Instant,
}

/// Instances of one fleet keyed by lower-cased computer name.
#[derive(Debug, Default)]
pub struct InstanceInventory {
    entries: HashMap<String, InstanceEntry>,
}

impl InstanceInventory {
    pub fn by_node_name(&self, node_name: &str) -> Option<&InstanceEntry> {
        self.entries.get(&node_name.to_lowercase())
    }

    pub fn by_instance_id(&self, instance_id: &str) -> Option<&InstanceEntry> {
        self.entries
            .values()
            .find(|entry| entry.instance_id.eq_ignore_ascii_case(instance_id))
    }

    pub fn records(&self) -> impl Iterator<Item = &Arc<InstanceRecord>> {
        self.entries.values().filter_map(|entry| entry.record.as_ref())
    }

    pub fn tombstones(&self) -> usize {
        self.entries.values().filter(|e| e.record.is_none()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds a snapshot from a fresh listing, carrying over instances of `previous` that
    /// disappeared as tombstones until they are older than [`TOMBSTONE_TTL`].
    pub fn from_listing(
        resource_group: &str,
        fleet_name: &str,
        listing: Vec<InstanceRecord>,
        previous: Option<&InstanceInventory>,
    ) -> Self {
        let now = Instant::now();
        let mut entries = HashMap::with_capacity(listing.len());

        for record in listing {
            let Some(node_name) = record.node_name() else {
                warn!(
                    fleet = %fleet_name,
                    instance_id = %record.instance_id,
                    "Skipping instance without a computer name"
                );
                continue;
            };
            entries.insert(
                node_name,
                InstanceEntry {
                    resource_group: resource_group.to_string(),
                    fleet_name: fleet_name.to_string(),
                    instance_id: record.instance_id.clone(),
                    record: Some(Arc::new(record)),
                    last_update: now,
                },
            );
        }

        if let Some(previous) = previous {
            for (node_name, old) in &previous.entries {
                if entries.contains_key(node_name) {
                    continue;
                }
                let last_update = if old.record.is_some() {
                    now
                } else {
                    old.last_update
                };
                if now.duration_since(last_update) > TOMBSTONE_TTL {
                    continue;
                }
                entries.insert(
                    node_name.clone(),
                    InstanceEntry {
                        record: None,
                        last_update,
                        ..old.clone()
                    },
                );
            }
        }

        Self { entries }
    }
}

pub struct InstanceInventoryLoader {
    client: Arc<dyn ComputeClient>,
}

impl InstanceInventoryLoader {
    pub fn new(client: Arc<dyn ComputeClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CacheLoader<InstanceInventory> for InstanceInventoryLoader {
    async fn load(
        &self,
        key: &str,
        previous: Option<Arc<InstanceInventory>>,
    ) -> Result<InstanceInventory, DomainError> {
        let (resource_group, fleet_name) = key
            .split_once('/')
            .ok_or_else(|| DomainError::InvalidResourceId(key.to_string()))?;

        let listing = self
            .client
            .list_instances(resource_group, fleet_name, true)
            .await?;

        let inventory = InstanceInventory::from_listing(
            resource_group,
            fleet_name,
            listing,
            previous.as_deref(),
        );
        debug!(
            key = %key,
            instances = inventory.len(),
            tombstones = inventory.tombstones(),
            "Instance inventory loaded"
        );
        Ok(inventory)
    }
}
