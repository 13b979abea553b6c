//! fleetlb infrastructure layer
pub mod cache;
pub mod client;
pub mod fixed_set;
pub mod scale_set;

pub use client::{InMemoryComputeClient, InventorySnapshot, TimeoutComputeClient};
pub use fixed_set::UnmanagedFixedSet;
pub use scale_set::ScaleSetNodeManager;
