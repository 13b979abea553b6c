mod describe_node;
mod get_vm_set_names;

pub use describe_node::{DescribeNodeUseCase, NodeDescription};
pub use get_vm_set_names::GetVmSetNamesUseCase;
