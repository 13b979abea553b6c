use super::classifier::{FleetRoleClassifier, NodeRole};
use super::identity::IdentityResolver;
use super::reconciler::BackendPoolReconciler;
use super::settings::ScaleSetSettings;
use crate::cache::CacheReadType;
use async_trait::async_trait;
use fleetlb_application::ports::{ComputeClient, NodeManager};
use fleetlb_domain::config::CacheConfig;
use fleetlb_domain::fleet::{CIDR_MASK_IPV4_TAG, CIDR_MASK_IPV6_TAG};
use fleetlb_domain::instance::InstanceRecord;
use fleetlb_domain::network::{NetworkInterfaceRecord, NetworkInterfaceReference};
use fleetlb_domain::resource_id::{
    last_segment, lowercase_resource_group, ScaleSetNicId, ScaleSetPublicIpId, ScaleSetVmId,
};
use fleetlb_domain::{
    BackendPoolTarget, CidrMasks, Config, DomainError, LoadBalancerMode, Node, NodeAddresses,
    NodeIdentity, Zone,
};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// [`NodeManager`] for scale-set nodes. Nodes outside any scale set are handed to the
/// fixed machine set manager.
pub struct ScaleSetNodeManager {
    client: Arc<dyn ComputeClient>,
    identity: Arc<IdentityResolver>,
    classifier: Arc<FleetRoleClassifier>,
    reconciler: Arc<BackendPoolReconciler>,
    fixed_set: Arc<dyn NodeManager>,
    settings: ScaleSetSettings,
}

impl ScaleSetNodeManager {
    pub fn new(
        client: Arc<dyn ComputeClient>,
        fixed_set: Arc<dyn NodeManager>,
        resource_groups: Vec<String>,
        cache: &CacheConfig,
        settings: ScaleSetSettings,
    ) -> Self {
        let identity = Arc::new(IdentityResolver::new(
            Arc::clone(&client),
            resource_groups,
            cache.fleet_ttl(),
            cache.instance_ttl(),
        ));
        let classifier = Arc::new(FleetRoleClassifier::new(Arc::clone(&identity)));
        let reconciler = Arc::new(BackendPoolReconciler::new(
            Arc::clone(&client),
            Arc::clone(&identity),
            Arc::clone(&classifier),
            Arc::clone(&fixed_set),
            settings.clone(),
        ));

        Self {
            client,
            identity,
            classifier,
            reconciler,
            fixed_set,
            settings,
        }
    }

    pub fn from_config(
        client: Arc<dyn ComputeClient>,
        fixed_set: Arc<dyn NodeManager>,
        config: &Config,
    ) -> Self {
        Self::new(
            client,
            fixed_set,
            config.provider.resource_groups(),
            &config.cache,
            ScaleSetSettings::from_config(config),
        )
    }

    pub fn identity(&self) -> &Arc<IdentityResolver> {
        &self.identity
    }

    pub fn reconciler(&self) -> &Arc<BackendPoolReconciler> {
        &self.reconciler
    }

    /// Instance record of a scale-set node, or `None` when the fixed set owns it.
    async fn instance(
        &self,
        node_name: &str,
        read_type: CacheReadType,
    ) -> Result<Option<(NodeIdentity, Arc<InstanceRecord>)>, DomainError> {
        match self.classifier.classify(node_name, read_type).await? {
            NodeRole::FixedSet => Ok(None),
            NodeRole::Fleet(identity) => {
                let record = self.identity.resolve_instance(&identity, read_type).await?;
                Ok(Some((identity, record)))
            }
        }
    }

    async fn primary_interface_of(
        &self,
        identity: &NodeIdentity,
        record: &InstanceRecord,
    ) -> Result<NetworkInterfaceRecord, DomainError> {
        let reference = primary_interface_reference(&record.network_interfaces, &identity.node_name)?;
        let nic_name = last_segment(&reference.id, '/')?;
        let nic_id = ScaleSetNicId::parse(&reference.id)?;

        let mut nic = match self
            .client
            .get_network_interface(
                &nic_id.resource_group,
                &identity.fleet_name,
                &record.instance_id,
                nic_name,
            )
            .await
        {
            Ok(nic) => nic,
            Err(DomainError::NotFound(_)) => return Err(DomainError::InstanceNotFound),
            Err(e) => return Err(e),
        };

        if nic.location.as_deref().map_or(true, str::is_empty) {
            nic.location = Some(record.location.clone());
        }
        Ok(nic)
    }

    async fn public_ip_of(&self, public_ip_id: &str) -> Result<Option<String>, DomainError> {
        let pip = match ScaleSetPublicIpId::parse(public_ip_id) {
            Ok(pip) => pip,
            Err(_) => {
                warn!(public_ip = %public_ip_id, "Public IP is not attached to a scale set instance");
                return Ok(None);
            }
        };

        match self
            .client
            .get_public_ip(
                &pip.resource_group,
                &pip.fleet_name,
                &pip.instance_id,
                &pip.nic_name,
                &pip.ip_configuration_name,
                &pip.public_ip_name,
            )
            .await
        {
            Ok(record) => Ok(record.ip_address),
            Err(DomainError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Scale sets of agent nodes, sorted and without duplicates.
    async fn agent_pool_fleets(&self, nodes: &[Node]) -> Result<Vec<String>, DomainError> {
        let mut fleets: Vec<String> = Vec::new();
        for node in nodes {
            if node.is_control_plane() || node.is_excluded_from_load_balancer() {
                continue;
            }
            match self
                .classifier
                .classify(&node.name, CacheReadType::Default)
                .await?
            {
                NodeRole::Fleet(identity) => {
                    if !fleets
                        .iter()
                        .any(|f| f.eq_ignore_ascii_case(&identity.fleet_name))
                    {
                        fleets.push(identity.fleet_name);
                    }
                }
                NodeRole::FixedSet => {
                    debug!(node = %node.name, "Node does not belong to any scale set");
                }
            }
        }
        fleets.sort();
        Ok(fleets)
    }
}

fn primary_interface_reference<'a>(
    references: &'a [NetworkInterfaceReference],
    node_name: &str,
) -> Result<&'a NetworkInterfaceReference, DomainError> {
    if references.len() == 1 {
        return Ok(&references[0]);
    }
    references
        .iter()
        .find(|r| r.primary.unwrap_or(false))
        .ok_or_else(|| {
            DomainError::AmbiguousConfiguration(format!(
                "failed to find a primary nic for {}",
                node_name
            ))
        })
}

fn zone_of(record: &InstanceRecord) -> Result<Zone, DomainError> {
    let location = record.location.to_lowercase();
    let failure_domain = if let Some(zone) = record.zones.first() {
        let zone_id: u32 = zone.parse().map_err(|_| {
            DomainError::InvalidInstanceData(format!("failed to parse zone {:?}", record.zones))
        })?;
        format!("{}-{}", location, zone_id)
    } else if let Some(fault_domain) = record.platform_fault_domain() {
        fault_domain.to_string()
    } else {
        return Err(DomainError::InvalidInstanceData(
            "failed to get zone info".to_string(),
        ));
    };

    Ok(Zone {
        failure_domain: failure_domain.to_lowercase(),
        region: location,
    })
}

fn parse_mask(fleet: &str, tag: &str, value: Option<&str>) -> Option<u8> {
    let value = value?;
    match value.parse() {
        Ok(mask) => Some(mask),
        Err(e) => {
            error!(fleet = %fleet, tag = %tag, value = %value, error = %e, "Invalid CIDR mask size tag");
            None
        }
    }
}

#[async_trait]
impl NodeManager for ScaleSetNodeManager {
    async fn get_power_status(&self, node_name: &str) -> Result<String, DomainError> {
        match self.instance(node_name, CacheReadType::Default).await? {
            Some((_, record)) => Ok(record.power_state()),
            None => self.fixed_set.get_power_status(node_name).await,
        }
    }

    async fn get_provisioning_state(
        &self,
        node_name: &str,
    ) -> Result<Option<String>, DomainError> {
        match self.instance(node_name, CacheReadType::Default).await? {
            Some((_, record)) => Ok(record.provisioning_state.clone()),
            None => self.fixed_set.get_provisioning_state(node_name).await,
        }
    }

    async fn get_instance_id(&self, node_name: &str) -> Result<String, DomainError> {
        match self.instance(node_name, CacheReadType::Unsafe).await? {
            Some((_, record)) => lowercase_resource_group(&record.id),
            None => self.fixed_set.get_instance_id(node_name).await,
        }
    }

    async fn get_instance_type(&self, node_name: &str) -> Result<String, DomainError> {
        match self.instance(node_name, CacheReadType::Unsafe).await? {
            Some((_, record)) => Ok(record.sku.clone().unwrap_or_default()),
            None => self.fixed_set.get_instance_type(node_name).await,
        }
    }

    async fn get_node_name_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<Option<String>, DomainError> {
        let vm = match ScaleSetVmId::parse(provider_id) {
            Ok(vm) => vm,
            Err(_) => {
                debug!(provider_id = %provider_id, "Not a scale set provider id");
                return self.fixed_set.get_node_name_by_provider_id(provider_id).await;
            }
        };

        let record = self
            .identity
            .resolve_instance_by_coordinates(
                &vm.resource_group,
                &vm.fleet_name,
                vm.instance_id(),
                CacheReadType::Unsafe,
            )
            .await
            .inspect_err(|e| {
                error!(provider_id = %provider_id, error = %e, "Unable to find node by provider id");
            })?;
        Ok(record.node_name())
    }

    async fn get_node_name_by_ip_configuration_id(
        &self,
        ip_configuration_id: &str,
    ) -> Result<(String, String), DomainError> {
        match ScaleSetNicId::parse(ip_configuration_id) {
            Ok(nic) => {
                let name = self
                    .reconciler
                    .node_name_by_ip_configuration_id(ip_configuration_id)
                    .await?;
                Ok((name.unwrap_or_default(), nic.fleet_name))
            }
            Err(_) => {
                debug!(
                    ip_configuration = %ip_configuration_id,
                    "Not a scale set IP configuration, asking the fixed set"
                );
                self.fixed_set
                    .get_node_name_by_ip_configuration_id(ip_configuration_id)
                    .await
            }
        }
    }

    async fn get_primary_interface(
        &self,
        node_name: &str,
    ) -> Result<NetworkInterfaceRecord, DomainError> {
        match self.instance(node_name, CacheReadType::Default).await? {
            Some((identity, record)) => self.primary_interface_of(&identity, &record).await,
            None => self.fixed_set.get_primary_interface(node_name).await,
        }
    }

    async fn get_ip_by_node_name(&self, node_name: &str) -> Result<NodeAddresses, DomainError> {
        let Some((identity, record)) = self.instance(node_name, CacheReadType::Default).await?
        else {
            return self.fixed_set.get_ip_by_node_name(node_name).await;
        };

        let nic = self.primary_interface_of(&identity, &record).await?;
        let ip_config = nic.primary_ip_configuration().ok_or_else(|| {
            DomainError::AmbiguousConfiguration(format!(
                "failed to find a primary IP configuration for {}",
                node_name
            ))
        })?;

        let public_ip = match ip_config.public_ip_address_id.as_deref() {
            Some(id) => self.public_ip_of(id).await?,
            None => None,
        };

        Ok(NodeAddresses {
            private_ip: ip_config.private_ip_address.clone().unwrap_or_default(),
            public_ip,
        })
    }

    async fn get_private_ips(&self, node_name: &str) -> Result<Vec<String>, DomainError> {
        let Some((identity, record)) = self.instance(node_name, CacheReadType::Default).await?
        else {
            return self.fixed_set.get_private_ips(node_name).await;
        };

        let nic = self.primary_interface_of(&identity, &record).await?;
        Ok(nic
            .ip_configurations
            .iter()
            .filter_map(|c| c.private_ip_address.clone())
            .collect())
    }

    async fn get_zone(&self, node_name: &str) -> Result<Zone, DomainError> {
        let Some((_, record)) = self.instance(node_name, CacheReadType::Unsafe).await? else {
            return self.fixed_set.get_zone(node_name).await;
        };

        match zone_of(&record) {
            Ok(zone) => Ok(zone),
            Err(e) => {
                error!(node = %node_name, error = %e, "Unexpected zone data, dropping cached instance");
                self.identity.invalidate_node(node_name).await;
                Err(e)
            }
        }
    }

    fn get_primary_vm_set_name(&self) -> String {
        self.settings.primary_vm_set_name.clone()
    }

    async fn get_node_vm_set_name(&self, node: &Node) -> Result<String, DomainError> {
        if let Ok(vm) = ScaleSetVmId::parse_provider_id(&node.provider_id) {
            return Ok(vm.fleet_name);
        }

        match self
            .classifier
            .classify(&node.name, CacheReadType::Unsafe)
            .await?
        {
            NodeRole::Fleet(identity) => Ok(identity.fleet_name),
            NodeRole::FixedSet => self.fixed_set.get_node_vm_set_name(node).await,
        }
    }

    async fn get_vm_set_names(
        &self,
        mode: &LoadBalancerMode,
        nodes: &[Node],
    ) -> Result<Vec<String>, DomainError> {
        if *mode == LoadBalancerMode::Unset || self.settings.load_balancer.is_single_standard() {
            return Ok(vec![self.settings.primary_vm_set_name.clone()]);
        }

        let fleets = self.agent_pool_fleets(nodes).await?;
        if fleets.is_empty() {
            error!(nodes = nodes.len(), "No scale sets found for nodes in the cluster");
            return Err(DomainError::NoScaleSetsFound(nodes.len()));
        }

        match mode {
            LoadBalancerMode::Named(name) if name.is_empty() => Err(DomainError::ConfigError(
                "load balancer mode annotation is empty".to_string(),
            )),
            LoadBalancerMode::Named(name) => fleets
                .into_iter()
                .find(|fleet| fleet.eq_ignore_ascii_case(name))
                .map(|fleet| vec![fleet])
                .ok_or_else(|| DomainError::ScaleSetNotFound(name.clone())),
            LoadBalancerMode::Auto | LoadBalancerMode::Unset => Ok(fleets),
        }
    }

    async fn ensure_host_in_pool(
        &self,
        node: &Node,
        target: &BackendPoolTarget,
    ) -> Result<(), DomainError> {
        self.reconciler.ensure_host_in_pool(node, target).await
    }

    async fn ensure_hosts_in_pool(
        &self,
        nodes: &[Node],
        target: &BackendPoolTarget,
    ) -> Result<(), DomainError> {
        self.reconciler.ensure_hosts_in_pool(nodes, target).await
    }

    async fn ensure_backend_pool_deleted(
        &self,
        backend_pool_id: &str,
        vm_set_name: &str,
        ip_configuration_ids: &[String],
        delete_from_vm_set: bool,
    ) -> Result<(), DomainError> {
        self.reconciler
            .ensure_backend_pool_deleted(
                backend_pool_id,
                vm_set_name,
                ip_configuration_ids,
                delete_from_vm_set,
            )
            .await
    }

    async fn get_node_cidr_masks_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<CidrMasks, DomainError> {
        let vm = match ScaleSetVmId::parse_provider_id(provider_id) {
            Ok(vm) => vm,
            Err(_) => {
                return self
                    .fixed_set
                    .get_node_cidr_masks_by_provider_id(provider_id)
                    .await
            }
        };

        let fleet = self.identity.get_fleet(&vm.fleet_name).await?;
        Ok(CidrMasks {
            ipv4: parse_mask(&fleet.name, CIDR_MASK_IPV4_TAG, fleet.tag(CIDR_MASK_IPV4_TAG)),
            ipv6: parse_mask(&fleet.name, CIDR_MASK_IPV6_TAG, fleet.tag(CIDR_MASK_IPV6_TAG)),
        })
    }
}
