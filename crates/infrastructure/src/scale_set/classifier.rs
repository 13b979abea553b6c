use super::identity::IdentityResolver;
use crate::cache::CacheReadType;
use fleetlb_domain::{DomainError, NodeIdentity};
use std::sync::Arc;
use tracing::debug;

/// Which node manager owns a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRole {
    Fleet(NodeIdentity),
    FixedSet,
}

/// Routes a node to the scale-set engine or to the fixed machine set.
///
/// A name that does not follow scale-set naming belongs to the fixed set. Any other
/// resolution failure, including an unknown scale-set node, is returned as is.
pub struct FleetRoleClassifier {
    identity: Arc<IdentityResolver>,
}

impl FleetRoleClassifier {
    pub fn new(identity: Arc<IdentityResolver>) -> Self {
        Self { identity }
    }

    pub async fn classify(
        &self,
        node_name: &str,
        read_type: CacheReadType,
    ) -> Result<NodeRole, DomainError> {
        match self.identity.resolve_fleet(node_name, read_type).await {
            Ok(identity) => Ok(NodeRole::Fleet(identity)),
            Err(DomainError::NotFleetInstance(_)) => {
                debug!(node = %node_name, "Node is managed by the fixed machine set");
                Ok(NodeRole::FixedSet)
            }
            Err(e) => Err(e),
        }
    }
}
