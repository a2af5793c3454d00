use thiserror::Error;

use super::MetricKind;

pub type Result<T> = std::result::Result<T, RouteComputeError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteComputeError {
    #[error("root node has not been set")]
    RootNotSet,

    #[error("root node {0} not found in topology")]
    RootNotFound(String),

    #[error("node {0} not found in topology")]
    NodeNotFound(String),

    #[error("predecessor chain of node {0} references a missing route state")]
    BrokenPredecessorChain(String),

    #[error("edge {origin} -> {destination} not found in topology")]
    EdgeNotFound { origin: String, destination: String },

    #[error("cost vector has {found} components, topology expects {expected}")]
    MetricSchemaMismatch { expected: usize, found: usize },

    #[error("cost component {position} is {found:?}, topology expects {expected:?}")]
    MetricKindMismatch {
        position: usize,
        expected: MetricKind,
        found: MetricKind,
    },

    #[error("cost component {position} has unsupported value {value}")]
    InvalidMetricValue { position: usize, value: f64 },

    #[error("K limit must be at least 1")]
    InvalidKLimit,
}

impl RouteComputeError {
    pub(crate) fn root_not_found(node: &impl std::fmt::Debug) -> Self {
        Self::RootNotFound(format!("{node:?}"))
    }

    pub(crate) fn node_not_found(node: &impl std::fmt::Debug) -> Self {
        Self::NodeNotFound(format!("{node:?}"))
    }

    pub(crate) fn broken_chain(node: &impl std::fmt::Debug) -> Self {
        Self::BrokenPredecessorChain(format!("{node:?}"))
    }

    pub(crate) fn edge_not_found(
        origin: &impl std::fmt::Debug,
        destination: &impl std::fmt::Debug,
    ) -> Self {
        Self::EdgeNotFound {
            origin: format!("{origin:?}"),
            destination: format!("{destination:?}"),
        }
    }
}
