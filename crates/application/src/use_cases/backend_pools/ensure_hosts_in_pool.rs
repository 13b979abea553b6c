use crate::ports::NodeManager;
use fleetlb_domain::{BackendPoolTarget, DomainError, Node};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Use case: make every node a member of one backend pool
pub struct EnsureHostsInPoolUseCase {
    node_manager: Arc<dyn NodeManager>,
}

impl EnsureHostsInPoolUseCase {
    pub fn new(node_manager: Arc<dyn NodeManager>) -> Self {
        Self { node_manager }
    }

    #[instrument(skip(self, nodes), fields(nodes = nodes.len(), pool = %target.backend_pool_id))]
    pub async fn execute(
        &self,
        nodes: &[Node],
        target: &BackendPoolTarget,
    ) -> Result<(), DomainError> {
        if target.backend_pool_id.trim().is_empty() {
            return Err(DomainError::InvalidResourceId(
                "backend pool id is empty".to_string(),
            ));
        }

        match self.node_manager.ensure_hosts_in_pool(nodes, target).await {
            Ok(()) => {
                info!(vm_set = %target.vm_set_name, "Backend pool membership ensured");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to ensure backend pool membership");
                Err(e)
            }
        }
    }
}
