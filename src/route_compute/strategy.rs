use std::collections::BTreeSet;

use serde::Serialize;

use super::{KShortestSolver, NodeId, Path, Result, ShortestPathSolver};

/// Next-hop view of a single-path route, as consumed by a network element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteEntry<N> {
    pub destination: N,
    pub next_hop: N,
    pub metric: f64,
    pub width: f64,
    pub hops: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KRouteEntry<N> {
    pub destination: N,
    pub next_hops: BTreeSet<N>,
    pub selected_next_hop: N,
    pub paths: Vec<Path<N>>,
}

/// One entry per settled destination other than the root.
pub fn shortest_route_entries<N: NodeId>(
    solver: &ShortestPathSolver<N>,
) -> Result<Vec<RouteEntry<N>>> {
    let mut out = Vec::new();
    for (destination, path) in solver.routes()? {
        if !solver.is_permanent(&destination) {
            continue;
        }
        let Some(next_hop) = path.get(1).cloned() else {
            continue;
        };
        let Some(state) = solver.route_map().get(&destination) else {
            continue;
        };
        out.push(RouteEntry {
            next_hop,
            metric: state.cost,
            width: state.width,
            hops: path.len() - 1,
            destination,
        });
    }
    Ok(out)
}

/// One entry per destination with at least one recorded path. The selected
/// next hop is the first hop of the first (best) recorded path.
pub fn k_route_entries<N: NodeId>(solver: &KShortestSolver<N>) -> Vec<KRouteEntry<N>> {
    let mut out = Vec::new();
    for (destination, paths) in solver.k_routes() {
        let next_hops: BTreeSet<N> = paths.iter().filter_map(|path| path.get(1).cloned()).collect();
        let Some(selected_next_hop) = paths.first().and_then(|path| path.get(1).cloned()) else {
            continue;
        };
        out.push(KRouteEntry {
            destination: destination.clone(),
            next_hops,
            selected_next_hop,
            paths: paths.clone(),
        });
    }
    out
}
