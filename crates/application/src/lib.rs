//! fleetlb application layer: ports to the outside world and the use cases driving them.
pub mod ports;
pub mod use_cases;
