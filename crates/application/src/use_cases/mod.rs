pub mod backend_pools;
pub mod nodes;

pub use backend_pools::{EnsureBackendPoolDeletedUseCase, EnsureHostsInPoolUseCase};
pub use nodes::{DescribeNodeUseCase, GetVmSetNamesUseCase, NodeDescription};
