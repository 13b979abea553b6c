mod compute_client;
mod node_manager;

pub use compute_client::ComputeClient;
pub use node_manager::NodeManager;
