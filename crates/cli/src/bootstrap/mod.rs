mod config;
mod logging;

pub use config::{load_config, load_inventory, load_nodes};
pub use logging::init_logging;
