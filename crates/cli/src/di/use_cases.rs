use super::NodeManagers;
use fleetlb_application::use_cases::{
    DescribeNodeUseCase, EnsureBackendPoolDeletedUseCase, EnsureHostsInPoolUseCase,
    GetVmSetNamesUseCase,
};
use std::sync::Arc;

pub struct UseCases {
    pub describe_node: Arc<DescribeNodeUseCase>,
    pub get_vm_set_names: Arc<GetVmSetNamesUseCase>,
    pub ensure_hosts_in_pool: Arc<EnsureHostsInPoolUseCase>,
    pub ensure_backend_pool_deleted: Arc<EnsureBackendPoolDeletedUseCase>,
}

impl UseCases {
    pub fn new(managers: &NodeManagers) -> Self {
        let node_manager = &managers.node_manager;

        Self {
            describe_node: Arc::new(DescribeNodeUseCase::new(node_manager.clone())),
            get_vm_set_names: Arc::new(GetVmSetNamesUseCase::new(node_manager.clone())),
            ensure_hosts_in_pool: Arc::new(EnsureHostsInPoolUseCase::new(node_manager.clone())),
            ensure_backend_pool_deleted: Arc::new(EnsureBackendPoolDeletedUseCase::new(
                node_manager.clone(),
            )),
        }
    }
}
