//! Scale-set identity resolution and backend pool reconciliation.

pub mod classifier;
pub mod identity;
pub mod inventory;
pub mod node_manager;
pub mod primary;
pub mod reconciler;
pub mod settings;

pub use classifier::{FleetRoleClassifier, NodeRole};
pub use identity::IdentityResolver;
pub use inventory::{FleetInventory, InstanceEntry, InstanceInventory};
pub use node_manager::ScaleSetNodeManager;
pub use reconciler::{BackendPoolReconciler, StagedInstance, NETWORK_UPDATE_OPERATION};
pub use settings::ScaleSetSettings;
