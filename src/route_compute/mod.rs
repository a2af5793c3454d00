mod error;
mod frontier;
mod graph;
mod ksp;
mod multimetric;
mod partition;
mod reconstruct;
mod spf;
mod strategy;
mod traits;
mod types;

pub use error::{Result, RouteComputeError};
pub use frontier::{policy_order, Frontier, SlotEntry, SpfEntry};
pub use graph::{Edge, Topology};
pub use ksp::{KShortestSolver, DEFAULT_K_LIMIT};
pub use multimetric::{Cost, CostVector, Limits, MetricKind, MetricSchema};
pub use partition::{discover_all_partitioned_links, discover_partitioned_links};
pub use reconstruct::{is_simple_path, reconstruct_slot_path, reconstruct_spf_path};
pub use spf::{
    compute_route_map, MetricSelection, ShortestPathSolver, SpfComputeEngine, SpfComputeInput,
    SpfSearchResult,
};
pub use strategy::{k_route_entries, shortest_route_entries, KRouteEntry, RouteEntry};
pub use traits::RouteComputeEngine;
pub use types::{
    KRouteMap, KRoutes, Label, NodeId, NodePair, Path, Slot, SpfPolicy, SpfRouteMap, SpfState,
};
