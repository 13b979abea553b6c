use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The node or instance cannot be located. Callers treat the node as gone.
    #[error("instance not found")]
    InstanceNotFound,

    /// The name does not follow the scale-set machine naming convention.
    #[error("not a scale set instance: {0}")]
    NotFleetInstance(String),

    #[error("ambiguous network configuration: {0}")]
    AmbiguousConfiguration(String),

    /// Remote resource reported as absent by the control plane.
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("remote call failed: {0}")]
    Remote(String),

    #[error("remote call {operation} exceeded its deadline")]
    RemoteTimeout { operation: String },

    #[error("invalid resource id: {0}")]
    InvalidResourceId(String),

    #[error("invalid instance data: {0}")]
    InvalidInstanceData(String),

    #[error("scale set not found: {0}")]
    ScaleSetNotFound(String),

    #[error("no scale sets found for nodes, node count({0})")]
    NoScaleSetsFound(usize),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    Aggregate(AggregateError),
}

impl DomainError {
    pub fn is_instance_not_found(&self) -> bool {
        matches!(self, Self::InstanceNotFound)
    }

    pub fn is_not_fleet_instance(&self) -> bool {
        matches!(self, Self::NotFleetInstance(_))
    }
}

/// Independent failures collected by a bulk operation.
///
/// Nested aggregates are flattened on insertion so the reported set is one level deep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateError {
    errors: Vec<DomainError>,
}

impl AggregateError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: DomainError) {
        match error {
            DomainError::Aggregate(inner) => self.errors.extend(inner.errors),
            other => self.errors.push(other),
        }
    }

    pub fn extend(&mut self, other: AggregateError) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[DomainError] {
        &self.errors
    }

    pub fn into_result(self) -> Result<(), DomainError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Aggregate(self))
        }
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.len() == 1 {
            return write!(f, "{}", self.errors[0]);
        }
        write!(f, "[")?;
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", err)?;
        }
        write!(f, "]")
    }
}

impl FromIterator<DomainError> for AggregateError {
    fn from_iter<I: IntoIterator<Item = DomainError>>(iter: I) -> Self {
        let mut aggregate = AggregateError::new();
        for err in iter {
            aggregate.push(err);
        }
        aggregate
    }
}
