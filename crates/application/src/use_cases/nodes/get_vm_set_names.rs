use crate::ports::NodeManager;
use fleetlb_domain::{DomainError, LoadBalancerMode, Node};
use std::sync::Arc;
use tracing::{info, instrument};

pub struct GetVmSetNamesUseCase {
    node_manager: Arc<dyn NodeManager>,
}

impl GetVmSetNamesUseCase {
    pub fn new(node_manager: Arc<dyn NodeManager>) -> Self {
        Self { node_manager }
    }

    /// `annotation` is the raw service mode annotation, `None` when the service has none.
    #[instrument(skip(self, nodes), fields(nodes = nodes.len()))]
    pub async fn execute(
        &self,
        annotation: Option<&str>,
        nodes: &[Node],
    ) -> Result<Vec<String>, DomainError> {
        let mode = LoadBalancerMode::from_annotation(annotation);
        let names = self.node_manager.get_vm_set_names(&mode, nodes).await?;
        info!(mode = ?mode, vm_sets = ?names, "Resolved VM sets");
        Ok(names)
    }
}
