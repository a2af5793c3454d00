use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::Serialize;

use super::CostVector;

/// Caller-supplied node identifier.
pub trait NodeId: Ord + Clone + Debug {}

impl<T: Ord + Clone + Debug> NodeId for T {}

/// Node sequence starting at the root.
pub type Path<N> = Vec<N>;

/// Directed `(origin, destination)` pair.
pub type NodePair<N> = (N, N);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Label {
    Tentative,
    Permanent,
}

/// Solver policy for the single-destination search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpfPolicy {
    /// Minimize the primary cost only.
    #[default]
    Basic,
    /// Minimize cost, break ties by the larger bottleneck width.
    WidestShortest,
    /// Maximize bottleneck width, break ties by the smaller cost.
    ShortestWidest,
}

/// Per-node record of the single-destination solver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpfState<N> {
    pub cost: f64,
    pub width: f64,
    pub predecessor: Option<N>,
    pub label: Label,
}

pub type SpfRouteMap<N> = BTreeMap<N, SpfState<N>>;

/// One of up to K candidate records held per node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot<N> {
    pub cost: CostVector,
    pub predecessor: Option<(N, usize)>,
    pub label: Label,
}

impl<N> Slot<N> {
    pub fn is_permanent(&self) -> bool {
        self.label == Label::Permanent
    }
}

pub type KRouteMap<N> = BTreeMap<N, Vec<Slot<N>>>;

pub type KRoutes<N> = BTreeMap<N, Vec<Path<N>>>;
