use crate::ports::NodeManager;
use fleetlb_domain::DomainError;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Use case: detach IP configurations from a backend pool being deleted
pub struct EnsureBackendPoolDeletedUseCase {
    node_manager: Arc<dyn NodeManager>,
}

impl EnsureBackendPoolDeletedUseCase {
    pub fn new(node_manager: Arc<dyn NodeManager>) -> Self {
        Self { node_manager }
    }

    #[instrument(skip(self, ip_configuration_ids), fields(ip_configurations = ip_configuration_ids.len()))]
    pub async fn execute(
        &self,
        backend_pool_id: &str,
        vm_set_name: &str,
        ip_configuration_ids: &[String],
        delete_from_vm_set: bool,
    ) -> Result<(), DomainError> {
        if ip_configuration_ids.is_empty() {
            info!("No IP configurations reference the backend pool");
            return Ok(());
        }

        self.node_manager
            .ensure_backend_pool_deleted(
                backend_pool_id,
                vm_set_name,
                ip_configuration_ids,
                delete_from_vm_set,
            )
            .await
            .inspect_err(|e| error!(error = %e, "Failed to remove backend pool references"))?;

        info!("Backend pool references removed");
        Ok(())
    }
}
