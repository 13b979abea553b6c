//! Backend pool membership for scale-set instances and fleet templates.
//!
//! Instance deltas are staged from cached snapshots, grouped per fleet and applied with one
//! batched update per group. Groups, fixed-set delegations and template updates run as
//! independent tasks; failures are collected, never short-circuited.
//!
//! Staging reads carry no concurrency token. Two reconciliations of different pools on the
//! same instance stage from the same snapshot and the last batched write wins.

use super::classifier::{FleetRoleClassifier, NodeRole};
use super::identity::IdentityResolver;
use super::primary::{self, PoolEdit};
use super::settings::ScaleSetSettings;
use crate::cache::{CacheReadType, KeyedLock};
use fleetlb_application::ports::{ComputeClient, NodeManager};
use fleetlb_domain::fleet::FleetTemplateDelta;
use fleetlb_domain::instance::{InstanceDelta, InstanceRecord};
use fleetlb_domain::network::NetworkInterfaceConfiguration;
use fleetlb_domain::resource_id::{ScaleSetNicId, ScaleSetVmId};
use fleetlb_domain::{AggregateError, BackendPoolTarget, DomainError, Node, NodeIdentity};
use futures::future::join_all;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Operation tag sent with batched instance updates.
pub const NETWORK_UPDATE_OPERATION: &str = "network_update";

/// A staged, not yet applied, instance update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedInstance {
    pub identity: NodeIdentity,
    pub instance_id: String,
    pub delta: InstanceDelta,
}

type GroupKey = (String, String);
type Task = JoinHandle<Result<(), DomainError>>;

pub struct BackendPoolReconciler {
    client: Arc<dyn ComputeClient>,
    identity: Arc<IdentityResolver>,
    classifier: Arc<FleetRoleClassifier>,
    fixed_set: Arc<dyn NodeManager>,
    template_lock: KeyedLock,
    settings: ScaleSetSettings,
}

impl BackendPoolReconciler {
    pub fn new(
        client: Arc<dyn ComputeClient>,
        identity: Arc<IdentityResolver>,
        classifier: Arc<FleetRoleClassifier>,
        fixed_set: Arc<dyn NodeManager>,
        settings: ScaleSetSettings,
    ) -> Self {
        Self {
            client,
            identity,
            classifier,
            fixed_set,
            template_lock: KeyedLock::new(),
            settings,
        }
    }

    /// Stages membership of one scale-set node in `target`. `None` means nothing to do.
    pub async fn stage_ensure(
        &self,
        identity: &NodeIdentity,
        target: &BackendPoolTarget,
    ) -> Result<Option<StagedInstance>, DomainError> {
        let record = match self
            .identity
            .resolve_instance(identity, CacheReadType::Default)
            .await
        {
            Ok(record) => record,
            Err(DomainError::InstanceNotFound) => {
                info!(node = %identity.node_name, "Skipping node that no longer exists");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if !target.vm_set_name.is_empty()
            && self
                .settings
                .requires_vm_set_match(&target.vm_set_name, &identity.fleet_name)
            && !target.vm_set_name.eq_ignore_ascii_case(&identity.fleet_name)
        {
            debug!(
                node = %identity.node_name,
                fleet = %identity.fleet_name,
                vm_set = %target.vm_set_name,
                "Skipping node outside the load balancer's VM set"
            );
            return Ok(None);
        }

        let Some(configs) = record.network_interface_configurations.as_deref() else {
            debug!(node = %identity.node_name, "Skipping instance without network configuration");
            return Ok(None);
        };

        let edit = primary::add_backend_pool(
            configs,
            &target.backend_pool_id,
            self.settings.ip_version(target.ipv6),
            self.settings.load_balancer.is_standard(),
            &identity.node_name,
        )?;

        Ok(self.staged(identity, &record, edit, &target.backend_pool_id))
    }

    /// Stages removal of `pool_id` from one node. `None` means nothing to do.
    pub async fn stage_delete(
        &self,
        node_name: &str,
        pool_id: &str,
    ) -> Result<Option<StagedInstance>, DomainError> {
        let (identity, record) = match self
            .identity
            .resolve_instance_by_node_name(node_name, CacheReadType::Default)
            .await
        {
            Ok(found) => found,
            Err(DomainError::InstanceNotFound) => {
                info!(node = %node_name, "Skipping node that no longer exists");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let Some(configs) = record.network_interface_configurations.as_deref() else {
            debug!(node = %node_name, "Skipping instance without network configuration");
            return Ok(None);
        };

        let edit = primary::remove_backend_pool(
            configs,
            pool_id,
            self.settings
                .ip_version(primary::is_ipv6_backend_pool(pool_id)),
            node_name,
        )?;

        Ok(self.staged(&identity, &record, edit, pool_id))
    }

    fn staged(
        &self,
        identity: &NodeIdentity,
        record: &InstanceRecord,
        edit: PoolEdit,
        pool_id: &str,
    ) -> Option<StagedInstance> {
        match edit {
            PoolEdit::Changed(configs) => Some(StagedInstance {
                identity: identity.clone(),
                instance_id: record.instance_id.clone(),
                delta: InstanceDelta {
                    location: record.location.clone(),
                    hardware_profile: record.hardware_profile.clone(),
                    network_interface_configurations: configs,
                },
            }),
            PoolEdit::AlreadySatisfied => {
                debug!(node = %identity.node_name, pool = %pool_id, "Backend pool already satisfied");
                None
            }
            PoolEdit::OtherLoadBalancer(load_balancer) => {
                info!(
                    node = %identity.node_name,
                    load_balancer = %load_balancer,
                    "Node already belongs to another load balancer, skipping"
                );
                None
            }
        }
    }

    /// Stages and applies one node on its own.
    pub async fn ensure_host_in_pool(
        self: &Arc<Self>,
        node: &Node,
        target: &BackendPoolTarget,
    ) -> Result<(), DomainError> {
        let identity = match self
            .classifier
            .classify(&node.name, CacheReadType::Default)
            .await?
        {
            NodeRole::FixedSet => return self.fixed_set.ensure_host_in_pool(node, target).await,
            NodeRole::Fleet(identity) => identity,
        };

        let Some(staged) = self.stage_ensure(&identity, target).await? else {
            return Ok(());
        };

        let mut groups = BTreeMap::new();
        group_staged(&mut groups, staged);
        let errors = self.apply_groups(groups, Vec::new()).await;
        errors.into_result()
    }

    pub async fn ensure_hosts_in_pool(
        self: &Arc<Self>,
        nodes: &[Node],
        target: &BackendPoolTarget,
    ) -> Result<(), DomainError> {
        let mut errors = AggregateError::new();
        let mut groups = BTreeMap::new();
        let mut delegated: Vec<Task> = Vec::new();

        for node in nodes {
            if self.settings.excludes_control_plane() && node.is_control_plane() {
                debug!(node = %node.name, "Excluding control plane node");
                continue;
            }
            if node.is_excluded_from_load_balancer() {
                debug!(node = %node.name, "Excluding labelled node");
                continue;
            }

            match self
                .classifier
                .classify(&node.name, CacheReadType::Default)
                .await
            {
                Ok(NodeRole::FixedSet) if self.settings.load_balancer.is_standard() => {
                    let fixed_set = Arc::clone(&self.fixed_set);
                    let node = node.clone();
                    let target = target.clone();
                    delegated.push(tokio::spawn(async move {
                        fixed_set.ensure_host_in_pool(&node, &target).await
                    }));
                }
                Ok(NodeRole::FixedSet) => {
                    debug!(
                        node = %node.name,
                        "Fixed set nodes cannot join a basic load balancer with scale set backends"
                    );
                }
                Ok(NodeRole::Fleet(identity)) => match self.stage_ensure(&identity, target).await {
                    Ok(Some(staged)) => group_staged(&mut groups, staged),
                    Ok(None) => {}
                    Err(e) => {
                        error!(node = %node.name, error = %e, "Failed to stage backend pool membership");
                        errors.push(e);
                    }
                },
                Err(DomainError::InstanceNotFound) => {
                    info!(node = %node.name, "Skipping node that no longer exists");
                }
                Err(e) => {
                    error!(node = %node.name, error = %e, "Failed to classify node");
                    errors.push(e);
                }
            }
        }

        errors.extend(self.apply_groups(groups, delegated).await);
        errors.extend(self.ensure_templates(nodes, target).await);
        errors.into_result()
    }

    pub async fn ensure_backend_pool_deleted(
        self: &Arc<Self>,
        pool_id: &str,
        vm_set_name: &str,
        ip_configuration_ids: &[String],
        delete_from_vm_set: bool,
    ) -> Result<(), DomainError> {
        let mut errors = AggregateError::new();
        let mut groups = BTreeMap::new();

        for ip_configuration_id in ip_configuration_ids {
            if let Ok(vm) = ScaleSetVmId::parse(ip_configuration_id) {
                if !self.settings.load_balancer.is_standard()
                    && !vm.fleet_name.eq_ignore_ascii_case(vm_set_name)
                {
                    continue;
                }
            }

            let node_name = match self.node_name_by_ip_configuration_id(ip_configuration_id).await {
                Ok(Some(name)) => name,
                Ok(None) => {
                    debug!(ip_configuration = %ip_configuration_id, "Instance has no computer name");
                    continue;
                }
                Err(DomainError::NotFleetInstance(_)) => continue,
                Err(DomainError::InstanceNotFound) => {
                    info!(ip_configuration = %ip_configuration_id, "Skipping IP configuration of a missing instance");
                    continue;
                }
                Err(e) => {
                    error!(ip_configuration = %ip_configuration_id, error = %e, "Failed to resolve IP configuration owner");
                    errors.push(e);
                    continue;
                }
            };

            match self.stage_delete(&node_name, pool_id).await {
                Ok(Some(staged)) => group_staged(&mut groups, staged),
                Ok(None) | Err(DomainError::NotFleetInstance(_)) => {}
                Err(e) => {
                    error!(node = %node_name, error = %e, "Failed to stage backend pool removal");
                    errors.push(e);
                }
            }
        }

        errors.extend(self.apply_groups(groups, Vec::new()).await);

        if delete_from_vm_set {
            let fleets = if self.settings.load_balancer.is_standard() {
                dedup_names(
                    ip_configuration_ids
                        .iter()
                        .filter_map(|id| ScaleSetVmId::parse(id).ok())
                        .filter(|vm| {
                            vm.resource_group
                                .eq_ignore_ascii_case(&self.settings.resource_group)
                        })
                        .map(|vm| vm.fleet_name),
                )
            } else {
                dedup_names([vm_set_name.to_string()])
            };
            errors.extend(self.remove_from_templates(fleets, pool_id).await);
        }

        errors.into_result()
    }

    /// Node name and fleet owning a scale-set IP configuration id.
    pub async fn node_name_by_ip_configuration_id(
        &self,
        ip_configuration_id: &str,
    ) -> Result<Option<String>, DomainError> {
        let nic = ScaleSetNicId::parse(ip_configuration_id)?;
        let record = self
            .identity
            .resolve_instance_by_coordinates(
                &nic.resource_group,
                &nic.fleet_name,
                &nic.instance_id,
                CacheReadType::Unsafe,
            )
            .await?;
        Ok(record.node_name())
    }

    async fn apply_groups(
        &self,
        groups: BTreeMap<GroupKey, HashMap<String, InstanceDelta>>,
        mut tasks: Vec<Task>,
    ) -> AggregateError {
        let touched: Vec<GroupKey> = groups.keys().cloned().collect();

        for ((resource_group, fleet_name), deltas) in groups {
            let client = Arc::clone(&self.client);
            let batch_size = self.settings.put_vm_batch_size;
            tasks.push(tokio::spawn(async move {
                info!(
                    resource_group = %resource_group,
                    fleet = %fleet_name,
                    instances = deltas.len(),
                    "Updating scale set instances"
                );
                client
                    .update_instances_batch(
                        &resource_group,
                        &fleet_name,
                        deltas,
                        NETWORK_UPDATE_OPERATION,
                        batch_size,
                    )
                    .await
                    .inspect_err(|e| {
                        error!(fleet = %fleet_name, error = %e, "Failed to update scale set instances");
                    })
            }));
        }

        let errors = join_tasks(tasks).await;

        for (resource_group, fleet_name) in touched {
            self.identity
                .invalidate_instances(&resource_group, &fleet_name);
        }
        errors
    }

    async fn ensure_templates(
        self: &Arc<Self>,
        nodes: &[Node],
        target: &BackendPoolTarget,
    ) -> AggregateError {
        let fleets = if self.settings.load_balancer.is_single_standard() {
            dedup_names(nodes.iter().filter_map(|node| self.template_fleet_of(node)))
        } else if target.vm_set_name.is_empty() {
            Vec::new()
        } else {
            dedup_names([target.vm_set_name.clone()])
        };

        let tasks = fleets
            .into_iter()
            .map(|fleet_name| {
                let this = Arc::clone(self);
                let target = target.clone();
                tokio::spawn(async move {
                    let ip_version = this.settings.ip_version(target.ipv6);
                    let check_lb = this.settings.load_balancer.is_standard();
                    this.update_template(&fleet_name, &target.backend_pool_id, |configs, owner| {
                        primary::add_backend_pool(
                            configs,
                            &target.backend_pool_id,
                            ip_version,
                            check_lb,
                            owner,
                        )
                    })
                    .await
                })
            })
            .collect();

        join_tasks(tasks).await
    }

    async fn remove_from_templates(
        self: &Arc<Self>,
        fleets: Vec<String>,
        pool_id: &str,
    ) -> AggregateError {
        let tasks = fleets
            .into_iter()
            .map(|fleet_name| {
                let this = Arc::clone(self);
                let pool_id = pool_id.to_string();
                tokio::spawn(async move {
                    let ip_version = this
                        .settings
                        .ip_version(primary::is_ipv6_backend_pool(&pool_id));
                    this.update_template(&fleet_name, &pool_id, |configs, owner| {
                        primary::remove_backend_pool(configs, &pool_id, ip_version, owner)
                    })
                    .await
                })
            })
            .collect();

        join_tasks(tasks).await
    }

    /// Fleet of a node for template reconciliation under a single standard load balancer.
    fn template_fleet_of(&self, node: &Node) -> Option<String> {
        if self.settings.excludes_control_plane() && node.is_control_plane() {
            return None;
        }
        if node.is_excluded_from_load_balancer() {
            return None;
        }
        match ScaleSetVmId::parse_provider_id(&node.provider_id) {
            Ok(vm) if vm.resource_group.eq_ignore_ascii_case(&self.settings.resource_group) => {
                Some(vm.fleet_name)
            }
            Ok(_) => None,
            Err(_) => {
                debug!(node = %node.name, "Node is not a scale set instance, skipping template");
                None
            }
        }
    }

    /// Edits one fleet template under the fleet's lock and drops the fleet inventory after
    /// an update attempt.
    async fn update_template<F>(
        &self,
        fleet_name: &str,
        pool_id: &str,
        edit: F,
    ) -> Result<(), DomainError>
    where
        F: FnOnce(&[NetworkInterfaceConfiguration], &str) -> Result<PoolEdit, DomainError>,
    {
        let _guard = self.template_lock.lock(&fleet_name.to_lowercase()).await;

        let fleet = self.identity.get_fleet(fleet_name).await?;
        if fleet.is_deallocating() {
            info!(fleet = %fleet.name, "Skipping scale set being deallocated");
            return Ok(());
        }
        let Some(configs) = fleet.network_interface_configurations.as_deref() else {
            debug!(fleet = %fleet.name, "Scale set template has no network configuration");
            return Ok(());
        };

        let configs = match edit(configs, &fleet.name)? {
            PoolEdit::Changed(configs) => configs,
            PoolEdit::AlreadySatisfied => return Ok(()),
            PoolEdit::OtherLoadBalancer(load_balancer) => {
                warn!(
                    fleet = %fleet.name,
                    load_balancer = %load_balancer,
                    "Scale set template already belongs to another load balancer, skipping"
                );
                return Ok(());
            }
        };

        info!(fleet = %fleet.name, pool = %pool_id, "Updating scale set template");
        let result = self
            .client
            .update_fleet_template(
                &fleet.resource_group,
                &fleet.name,
                FleetTemplateDelta {
                    location: fleet.location.clone(),
                    network_interface_configurations: configs,
                },
            )
            .await;
        self.identity.invalidate_fleets();

        result.inspect_err(|e| {
            error!(fleet = %fleet.name, error = %e, "Failed to update scale set template");
        })
    }
}

fn group_staged(
    groups: &mut BTreeMap<GroupKey, HashMap<String, InstanceDelta>>,
    staged: StagedInstance,
) {
    groups
        .entry((staged.identity.resource_group, staged.identity.fleet_name))
        .or_default()
        .insert(staged.instance_id, staged.delta);
}

fn dedup_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for name in names {
        if !unique.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
            unique.push(name);
        }
    }
    unique
}

async fn join_tasks(tasks: Vec<Task>) -> AggregateError {
    let mut errors = AggregateError::new();
    for result in join_all(tasks).await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => errors.push(e),
            Err(join_error) => {
                errors.push(DomainError::Remote(format!("update task failed: {}", join_error)))
            }
        }
    }
    errors
}
