//! fleetlb domain layer
pub mod config;
pub mod errors;
pub mod fleet;
pub mod instance;
pub mod load_balancer;
pub mod naming;
pub mod network;
pub mod node;
pub mod resource_id;

pub use config::{CliOverrides, Config, ConfigError};
pub use errors::{AggregateError, DomainError};
pub use fleet::{FleetRecord, FleetTemplateDelta};
pub use instance::{InstanceDelta, InstanceRecord};
pub use load_balancer::{BackendPoolTarget, LoadBalancerMode, LoadBalancerSku};
pub use network::{IpConfiguration, IpVersion, NetworkInterfaceConfiguration};
pub use node::{CidrMasks, Node, NodeAddresses, NodeIdentity, Zone};
