mod node_managers;
mod use_cases;

pub use node_managers::NodeManagers;
pub use use_cases::UseCases;
