pub mod cache;
pub mod errors;
pub mod load_balancer;
pub mod logging;
pub mod provider;
pub mod root;

pub use cache::CacheConfig;
pub use errors::ConfigError;
pub use load_balancer::LoadBalancerConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use provider::ProviderConfig;
pub use root::{CliOverrides, Config};
