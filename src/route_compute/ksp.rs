use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::frontier::{Frontier, SlotEntry};
use super::reconstruct::{is_simple_path, reconstruct_slot_path};
use super::{
    CostVector, Edge, KRouteMap, KRoutes, Label, Limits, MetricSchema, NodeId, Path, Result,
    RouteComputeError, Slot, Topology,
};

pub const DEFAULT_K_LIMIT: usize = 3;

/// Keeps up to K candidate slots per node and records up to K loop-free
/// paths per destination.
///
/// When a node already holds K slots, a new candidate only replaces that
/// node's least favorable tentative slot. This is cheaper than an exact
/// K-shortest-paths search (Yen) and can miss some of the K best paths on
/// adversarial graphs.
#[derive(Debug, Clone)]
pub struct KShortestSolver<N> {
    topology: Topology<N>,
    k_limit: usize,
    limits: Limits,
    root: Option<N>,
    route_map: KRouteMap<N>,
    k_routes: KRoutes<N>,
}

impl<N: NodeId> KShortestSolver<N> {
    pub fn new(schema: MetricSchema, k_limit: usize) -> Result<Self> {
        Self::with_topology(Topology::new(schema), k_limit)
    }

    pub fn with_topology(topology: Topology<N>, k_limit: usize) -> Result<Self> {
        if k_limit == 0 {
            return Err(RouteComputeError::InvalidKLimit);
        }
        Ok(Self {
            topology,
            k_limit,
            limits: Limits::default(),
            root: None,
            route_map: BTreeMap::new(),
            k_routes: BTreeMap::new(),
        })
    }

    pub fn topology(&self) -> &Topology<N> {
        &self.topology
    }

    pub fn replace_topology(&mut self, topology: Topology<N>) {
        self.topology = topology;
        self.clear_results();
    }

    pub fn k_limit(&self) -> usize {
        self.k_limit
    }

    pub fn set_k_limit(&mut self, k_limit: usize) -> Result<()> {
        if k_limit == 0 {
            return Err(RouteComputeError::InvalidKLimit);
        }
        self.k_limit = k_limit;
        self.clear_results();
        Ok(())
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Bounds the leading cost positions; later positions stay unbounded.
    pub fn set_limits(&mut self, values: &[f64]) {
        let mut values = values.to_vec();
        values.truncate(self.topology.schema().len());
        self.limits.set(&values);
        self.clear_results();
    }

    pub fn reset_limits(&mut self) {
        self.limits.reset();
        self.clear_results();
    }

    pub fn root(&self) -> Option<&N> {
        self.root.as_ref()
    }

    /// Every setter discards the last results; re-run before querying.
    pub fn set_root(&mut self, root: N) {
        self.root = Some(root);
        self.clear_results();
    }

    pub fn add_node(&mut self, node: N) {
        self.topology.add_node(node);
    }

    pub fn add_edge(&mut self, origin: N, destination: N, cost: CostVector) -> Result<()> {
        if self.topology.add_edge(origin, destination, cost)? {
            self.clear_results();
        }
        Ok(())
    }

    pub fn add_link(&mut self, origin: N, destination: N, values: &[f64]) -> Result<()> {
        if self.topology.add_link(origin, destination, values)? {
            self.clear_results();
        }
        Ok(())
    }

    pub fn remove_edge(&mut self, origin: &N, destination: &N) -> Option<Edge<N>> {
        let removed = self.topology.remove_edge(origin, destination);
        if removed.is_some() {
            self.clear_results();
        }
        removed
    }

    pub fn get_edge(&self, origin: &N, destination: &N) -> Option<&Edge<N>> {
        self.topology.get_edge(origin, destination)
    }

    pub fn clear(&mut self) {
        self.topology.clear();
        self.clear_results();
    }

    fn clear_results(&mut self) {
        self.route_map.clear();
        self.k_routes.clear();
    }

    pub fn run(&mut self) -> Result<()> {
        self.search(None).map(|_| ())
    }

    /// Stops once `target` holds K permanent slots and returns `true`;
    /// `false` when the frontier ran dry first.
    pub fn run_until(&mut self, target: &N) -> Result<bool> {
        self.search(Some(target))
    }

    fn search(&mut self, target: Option<&N>) -> Result<bool> {
        self.clear_results();
        let root = self.root.clone().ok_or(RouteComputeError::RootNotSet)?;
        if !self.topology.contains_node(&root) {
            return Err(RouteComputeError::root_not_found(&root));
        }

        let k = self.k_limit;
        let neutral = self.topology.schema().neutral();
        let root_slot = Slot {
            cost: neutral.clone(),
            predecessor: None,
            label: Label::Permanent,
        };
        self.route_map.insert(root.clone(), vec![root_slot; k]);

        let mut frontier = Frontier::new();
        frontier.push(SlotEntry {
            node: root.clone(),
            slot: 0,
            cost: neutral,
        });

        let mut reached = false;
        let mut rejected_loops = 0usize;
        let mut evictions = 0usize;

        loop {
            let route_map = &self.route_map;
            let Some(entry) = frontier.pop_min(|entry: &SlotEntry<N>| {
                if entry.node == root {
                    return false;
                }
                let Some(slots) = route_map.get(&entry.node) else {
                    return false;
                };
                match slots.get(entry.slot) {
                    Some(slot) if slot.is_permanent() || slot.cost != entry.cost => return true,
                    _ => {}
                }
                slots.len() == k && slots.iter().all(Slot::is_permanent)
            }) else {
                break;
            };

            let slots = self
                .route_map
                .get(&entry.node)
                .ok_or_else(|| RouteComputeError::node_not_found(&entry.node))?;
            let slot_cost = slots
                .get(entry.slot)
                .map(|slot| slot.cost.clone())
                .ok_or_else(|| RouteComputeError::broken_chain(&entry.node))?;

            let path = reconstruct_slot_path(&self.route_map, &root, &entry.node, entry.slot)?
                .ok_or_else(|| RouteComputeError::broken_chain(&entry.node))?;
            if !is_simple_path(&path) {
                rejected_loops += 1;
                trace!(node = ?entry.node, slot = entry.slot, "loop rejected");
                continue;
            }

            if entry.node != root {
                let recorded = self.k_routes.entry(entry.node.clone()).or_default();
                if recorded.contains(&path) {
                    trace!(node = ?entry.node, slot = entry.slot, "duplicate path skipped");
                    continue;
                }
                if recorded.len() < k {
                    recorded.push(path.clone());
                }
            }

            let slots = self
                .route_map
                .get_mut(&entry.node)
                .ok_or_else(|| RouteComputeError::node_not_found(&entry.node))?;
            slots[entry.slot].label = Label::Permanent;
            let permanent = slots.iter().filter(|slot| slot.is_permanent()).count();

            if target == Some(&entry.node) && permanent >= k {
                reached = true;
                break;
            }

            let edges = self
                .topology
                .edges_from(&entry.node)
                .ok_or_else(|| RouteComputeError::node_not_found(&entry.node))?;
            for edge in edges {
                if path.contains(&edge.destination) {
                    continue;
                }
                let cost = slot_cost.combine(&edge.cost)?;
                if !self.limits.admits(&cost) {
                    continue;
                }

                let next = self.route_map.entry(edge.destination.clone()).or_default();
                let predecessor = Some((entry.node.clone(), entry.slot));

                let slot = if next.len() < k {
                    next.push(Slot {
                        cost: cost.clone(),
                        predecessor,
                        label: Label::Tentative,
                    });
                    next.len() - 1
                } else {
                    let worst = next
                        .iter()
                        .enumerate()
                        .filter(|(_, slot)| !slot.is_permanent())
                        .max_by(|(_, a), (_, b)| a.cost.lexicographic_cmp(&b.cost));
                    let Some((idx, worst)) = worst else {
                        continue;
                    };
                    if !cost.is_better_than(&worst.cost) {
                        continue;
                    }
                    evictions += 1;
                    trace!(node = ?edge.destination, slot = idx, "tentative slot replaced");
                    next[idx].cost = cost.clone();
                    next[idx].predecessor = predecessor;
                    idx
                };

                frontier.push(SlotEntry {
                    node: edge.destination.clone(),
                    slot,
                    cost,
                });
            }
        }

        debug!(
            root = ?root,
            k,
            destinations = self.k_routes.len(),
            rejected_loops,
            evictions,
            reached,
            "k-shortest search finished"
        );
        Ok(reached)
    }

    pub fn route_map(&self) -> &KRouteMap<N> {
        &self.route_map
    }

    pub fn k_routes(&self) -> &KRoutes<N> {
        &self.k_routes
    }

    /// Number of candidate slots held for `node`, `None` if never reached.
    pub fn num_routes(&self, node: &N) -> Option<usize> {
        self.route_map.get(node).map(Vec::len)
    }

    /// Path of slot `k` of `node`, walked through the slot predecessors.
    pub fn route_k(&self, node: &N, k: usize) -> Result<Option<Path<N>>> {
        let Some(root) = self.root.as_ref() else {
            return Ok(None);
        };
        reconstruct_slot_path(&self.route_map, root, node, k)
    }

    /// Distinct loop-free paths recorded for `node`, at most K.
    pub fn routes_k(&self, node: &N) -> &[Path<N>] {
        self.k_routes.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every slot's path for every node.
    pub fn all_routes_k(&self) -> Result<BTreeMap<N, Vec<Path<N>>>> {
        let mut out = BTreeMap::new();
        let Some(root) = self.root.as_ref() else {
            return Ok(out);
        };
        for (node, slots) in &self.route_map {
            let mut paths = Vec::with_capacity(slots.len());
            for idx in 0..slots.len() {
                if let Some(path) = reconstruct_slot_path(&self.route_map, root, node, idx)? {
                    paths.push(path);
                }
            }
            out.insert(node.clone(), paths);
        }
        Ok(out)
    }

    pub fn cost_k(&self, node: &N, k: usize) -> Option<&CostVector> {
        self.route_map
            .get(node)
            .and_then(|slots| slots.get(k))
            .map(|slot| &slot.cost)
    }
}
