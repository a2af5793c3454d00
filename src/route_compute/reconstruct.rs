use std::collections::BTreeSet;

use super::{KRouteMap, NodeId, Path, Result, RouteComputeError, SpfRouteMap};

/// Follows single-solver predecessors from `node` back to `root`.
///
/// `Ok(None)` when `node` was never reached. A chain that leaves the route
/// map or never reaches the root is a consistency error.
pub fn reconstruct_spf_path<N: NodeId>(
    route_map: &SpfRouteMap<N>,
    root: &N,
    node: &N,
) -> Result<Option<Path<N>>> {
    if !route_map.contains_key(node) {
        return Ok(None);
    }

    let mut reversed = vec![node.clone()];
    let mut current = node;
    let max_steps = route_map.len() + 1;
    for _ in 0..max_steps {
        if current == root {
            reversed.reverse();
            return Ok(Some(reversed));
        }
        let state = route_map
            .get(current)
            .ok_or_else(|| RouteComputeError::broken_chain(node))?;
        let parent = state
            .predecessor
            .as_ref()
            .ok_or_else(|| RouteComputeError::broken_chain(current))?;
        reversed.push(parent.clone());
        current = parent;
    }

    Err(RouteComputeError::broken_chain(node))
}

/// Follows `(node, slot)` predecessors of the K-shortest solver back to `root`.
pub fn reconstruct_slot_path<N: NodeId>(
    route_map: &KRouteMap<N>,
    root: &N,
    node: &N,
    slot: usize,
) -> Result<Option<Path<N>>> {
    let Some(slots) = route_map.get(node) else {
        return Ok(None);
    };
    if slot >= slots.len() {
        return Ok(None);
    }

    let mut reversed = vec![node.clone()];
    let mut current = node;
    let mut idx = slot;
    let max_steps: usize = route_map.values().map(Vec::len).sum::<usize>() + 1;
    for _ in 0..max_steps {
        if current == root {
            reversed.reverse();
            return Ok(Some(reversed));
        }
        let state = route_map
            .get(current)
            .and_then(|slots| slots.get(idx))
            .ok_or_else(|| RouteComputeError::broken_chain(current))?;
        let (parent, parent_idx) = state
            .predecessor
            .as_ref()
            .ok_or_else(|| RouteComputeError::broken_chain(current))?;
        reversed.push(parent.clone());
        current = parent;
        idx = *parent_idx;
    }

    Err(RouteComputeError::broken_chain(node))
}

pub fn is_simple_path<N: NodeId>(path: &[N]) -> bool {
    let mut seen = BTreeSet::new();
    path.iter().all(|node| seen.insert(node))
}
