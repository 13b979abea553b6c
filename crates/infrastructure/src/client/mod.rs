mod deadline;
mod memory;

pub use deadline::TimeoutComputeClient;
pub use memory::{InMemoryComputeClient, InventorySnapshot, SnapshotInterface, SnapshotPublicIp};
