#![allow(dead_code)]
use async_trait::async_trait;
use fleetlb_application::ports::ComputeClient;
use fleetlb_domain::fleet::{FleetRecord, FleetTemplateDelta};
use fleetlb_domain::instance::{InstanceDelta, InstanceRecord};
use fleetlb_domain::network::{NetworkInterfaceRecord, PublicIpRecord};
use fleetlb_domain::DomainError;
use fleetlb_infrastructure::client::{InMemoryComputeClient, InventorySnapshot};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// One applied batched instance update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCall {
    pub resource_group: String,
    pub fleet_name: String,
    pub instance_ids: Vec<String>,
    pub operation: String,
}

/// In-memory compute client that counts calls and can be told to fail.
pub struct CountingComputeClient {
    inner: InMemoryComputeClient,
    list_fleets_calls: AtomicUsize,
    list_instances_calls: AtomicUsize,
    template_updates: AtomicUsize,
    nic_reads: AtomicUsize,
    batches: RwLock<Vec<BatchCall>>,
    failing_fleets: RwLock<Vec<String>>,
    fail_listing: RwLock<bool>,
    list_delay: Duration,
}

impl CountingComputeClient {
    pub fn new(snapshot: InventorySnapshot) -> Self {
        Self::with_delay(snapshot, Duration::ZERO)
    }

    /// Listing calls sleep for `list_delay` before answering.
    pub fn with_delay(snapshot: InventorySnapshot, list_delay: Duration) -> Self {
        Self {
            inner: InMemoryComputeClient::new(snapshot),
            list_fleets_calls: AtomicUsize::new(0),
            list_instances_calls: AtomicUsize::new(0),
            template_updates: AtomicUsize::new(0),
            nic_reads: AtomicUsize::new(0),
            batches: RwLock::new(Vec::new()),
            failing_fleets: RwLock::new(Vec::new()),
            fail_listing: RwLock::new(false),
            list_delay,
        }
    }

    pub fn shared(snapshot: InventorySnapshot) -> Arc<Self> {
        Arc::new(Self::new(snapshot))
    }

    pub fn inner(&self) -> &InMemoryComputeClient {
        &self.inner
    }

    pub async fn snapshot(&self) -> InventorySnapshot {
        self.inner.snapshot().await
    }

    pub async fn fail_updates_for(&self, fleet_name: &str) {
        self.failing_fleets.write().await.push(fleet_name.to_string());
    }

    pub async fn set_fail_listing(&self, fail: bool) {
        *self.fail_listing.write().await = fail;
    }

    pub fn list_fleets_calls(&self) -> usize {
        self.list_fleets_calls.load(Ordering::SeqCst)
    }

    pub fn list_instances_calls(&self) -> usize {
        self.list_instances_calls.load(Ordering::SeqCst)
    }

    pub fn template_updates(&self) -> usize {
        self.template_updates.load(Ordering::SeqCst)
    }

    pub fn nic_reads(&self) -> usize {
        self.nic_reads.load(Ordering::SeqCst)
    }

    pub async fn batches(&self) -> Vec<BatchCall> {
        self.batches.read().await.clone()
    }

    pub async fn instance(&self, fleet_name: &str, instance_id: &str) -> Option<InstanceRecord> {
        self.inner
            .snapshot()
            .await
            .instances
            .into_iter()
            .find(|i| i.fleet_name == fleet_name && i.instance_id == instance_id)
    }

    pub async fn fleet(&self, fleet_name: &str) -> Option<FleetRecord> {
        self.inner
            .snapshot()
            .await
            .fleets
            .into_iter()
            .find(|f| f.name == fleet_name)
    }

    async fn listing_allowed(&self) -> Result<(), DomainError> {
        if !self.list_delay.is_zero() {
            tokio::time::sleep(self.list_delay).await;
        }
        if *self.fail_listing.read().await {
            return Err(DomainError::Remote("listing unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ComputeClient for CountingComputeClient {
    async fn list_fleets(&self, resource_group: &str) -> Result<Vec<FleetRecord>, DomainError> {
        self.list_fleets_calls.fetch_add(1, Ordering::SeqCst);
        self.listing_allowed().await?;
        self.inner.list_fleets(resource_group).await
    }

    async fn list_instances(
        &self,
        resource_group: &str,
        fleet_name: &str,
        with_instance_view: bool,
    ) -> Result<Vec<InstanceRecord>, DomainError> {
        self.list_instances_calls.fetch_add(1, Ordering::SeqCst);
        self.listing_allowed().await?;
        self.inner
            .list_instances(resource_group, fleet_name, with_instance_view)
            .await
    }

    async fn update_instances_batch(
        &self,
        resource_group: &str,
        fleet_name: &str,
        deltas: HashMap<String, InstanceDelta>,
        operation: &str,
        batch_size: usize,
    ) -> Result<(), DomainError> {
        let mut instance_ids: Vec<String> = deltas.keys().cloned().collect();
        instance_ids.sort();
        self.batches.write().await.push(BatchCall {
            resource_group: resource_group.to_string(),
            fleet_name: fleet_name.to_string(),
            instance_ids,
            operation: operation.to_string(),
        });

        if self
            .failing_fleets
            .read()
            .await
            .iter()
            .any(|f| f.eq_ignore_ascii_case(fleet_name))
        {
            return Err(DomainError::Remote(format!("update of {} rejected", fleet_name)));
        }
        self.inner
            .update_instances_batch(resource_group, fleet_name, deltas, operation, batch_size)
            .await
    }

    async fn update_fleet_template(
        &self,
        resource_group: &str,
        fleet_name: &str,
        delta: FleetTemplateDelta,
    ) -> Result<(), DomainError> {
        self.template_updates.fetch_add(1, Ordering::SeqCst);
        self.inner
            .update_fleet_template(resource_group, fleet_name, delta)
            .await
    }

    async fn get_network_interface(
        &self,
        resource_group: &str,
        fleet_name: &str,
        instance_id: &str,
        nic_name: &str,
    ) -> Result<NetworkInterfaceRecord, DomainError> {
        self.nic_reads.fetch_add(1, Ordering::SeqCst);
        self.inner
            .get_network_interface(resource_group, fleet_name, instance_id, nic_name)
            .await
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
        self.inner
            .get_public_ip(
                resource_group,
                fleet_name,
                instance_id,
                nic_name,
                ip_configuration_name,
                public_ip_name,
            )
            .await
    }
}
