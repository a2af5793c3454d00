use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::{
    NodeId, NodePair, Result, RouteComputeEngine, RouteComputeError, ShortestPathSolver,
    SpfComputeEngine, SpfComputeInput, SpfPolicy, Topology,
};

/// Removes `origin -> destination` from `working`, checks whether the
/// destination is still reachable from the origin, then restores the edge.
fn edge_is_critical<N: NodeId>(
    working: &mut Topology<N>,
    engine: &SpfComputeEngine,
    origin: &N,
    destination: &N,
) -> Result<bool> {
    let edge = working
        .remove_edge(origin, destination)
        .ok_or_else(|| RouteComputeError::edge_not_found(origin, destination))?;

    let search = engine.compute(&SpfComputeInput {
        topology: &*working,
        root: origin.clone(),
        target: Some(destination.clone()),
    });

    working.add_edge(origin.clone(), edge.destination, edge.cost)?;
    Ok(!search?.target_reached)
}

/// Critical links along `path`: consecutive pairs whose direct edge is the
/// only way from the first node to the second.
pub fn discover_partitioned_links<N: NodeId>(
    topology: &Topology<N>,
    path: &[N],
    policy: SpfPolicy,
) -> Result<Vec<NodePair<N>>> {
    let engine = SpfComputeEngine { policy };
    let mut working = topology.clone();
    let mut links = Vec::new();

    for hop in path.windows(2) {
        let (origin, destination) = (&hop[0], &hop[1]);
        if !working.contains_node(origin) {
            return Err(RouteComputeError::node_not_found(origin));
        }
        if edge_is_critical(&mut working, &engine, origin, destination)? {
            links.push((origin.clone(), destination.clone()));
        }
    }

    debug!(hops = path.len().saturating_sub(1), critical = links.len(), "path partition analysis");
    Ok(links)
}

/// Critical links of the whole topology. Each unordered node pair is tested
/// once; a critical pair is reported in both directions.
pub fn discover_all_partitioned_links<N: NodeId>(
    topology: &Topology<N>,
    policy: SpfPolicy,
) -> Result<Vec<NodePair<N>>> {
    let engine = SpfComputeEngine { policy };
    let mut working = topology.clone();
    let mut tested: BTreeSet<NodePair<N>> = BTreeSet::new();
    let mut links = Vec::new();

    for (origin, edge) in topology.edges() {
        let destination = &edge.destination;
        let key = if origin <= destination {
            (origin.clone(), destination.clone())
        } else {
            (destination.clone(), origin.clone())
        };
        if !tested.insert(key) {
            continue;
        }
        if origin == destination {
            warn!(node = ?origin, "self loop ignored by partition analysis");
            continue;
        }
        if edge_is_critical(&mut working, &engine, origin, destination)? {
            links.push((origin.clone(), destination.clone()));
            links.push((destination.clone(), origin.clone()));
        }
    }

    debug!(
        pairs = tested.len(),
        critical = links.len() / 2,
        "topology partition analysis"
    );
    Ok(links)
}

impl<N: NodeId> ShortestPathSolver<N> {
    /// Runs on a copy of the topology; the solver's routes are left untouched.
    pub fn discover_partitioned_links(&self, path: &[N]) -> Result<Vec<NodePair<N>>> {
        discover_partitioned_links(self.topology(), path, self.policy())
    }

    pub fn discover_all_partitioned_links(&self) -> Result<Vec<NodePair<N>>> {
        discover_all_partitioned_links(self.topology(), self.policy())
    }
}
