use serde::{Deserialize, Serialize};

/// Annotation value asking for every eligible VM set.
pub const LOAD_BALANCER_MODE_AUTO: &str = "__auto__";

/// Suffix distinguishing an internal load balancer from its public sibling.
pub const INTERNAL_LOAD_BALANCER_SUFFIX: &str = "-internal";

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoadBalancerSku {
    Basic,

    #[default]
    Standard,
}

/// Service scope annotation selecting which VM sets back a load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadBalancerMode {
    /// No annotation: the primary VM set.
    #[default]
    Unset,

    Auto,

    Named(String),
}

impl LoadBalancerMode {
    pub fn from_annotation(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None => Self::Unset,
            Some(mode) if mode.eq_ignore_ascii_case(LOAD_BALANCER_MODE_AUTO) => Self::Auto,
            Some(mode) => Self::Named(mode.to_string()),
        }
    }
}

/// Desired membership of a set of nodes in one backend pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendPoolTarget {
    pub backend_pool_id: String,

    /// VM set the load balancer is scoped to. Empty means unscoped.
    pub vm_set_name: String,

    /// Select the IP configuration by address family instead of the primary flag.
    pub ipv6: bool,
}

impl BackendPoolTarget {
    pub fn new(backend_pool_id: impl Into<String>, vm_set_name: impl Into<String>) -> Self {
        Self {
            backend_pool_id: backend_pool_id.into(),
            vm_set_name: vm_set_name.into(),
            ipv6: false,
        }
    }

    pub fn with_ipv6(mut self, ipv6: bool) -> Self {
        self.ipv6 = ipv6;
        self
    }
}
