use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::frontier::{policy_order, Frontier, SpfEntry};
use super::reconstruct::reconstruct_spf_path;
use super::{
    CostVector, Edge, Label, MetricSchema, NodeId, Path, Result, RouteComputeEngine,
    RouteComputeError, SpfPolicy, SpfRouteMap, SpfState, Topology,
};

/// Which cost-vector positions the single-destination solver reads.
///
/// The primary cost is the first additive position (each hop costs `1.0`
/// when the schema has none). The width is the first concave position,
/// combined as a bottleneck; `+inf` when the schema has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricSelection {
    pub cost_position: Option<usize>,
    pub width_position: Option<usize>,
}

impl MetricSelection {
    pub fn from_schema(schema: &MetricSchema) -> Self {
        Self {
            cost_position: schema.kinds().iter().position(|kind| kind.is_additive()),
            width_position: schema.kinds().iter().position(|kind| !kind.is_additive()),
        }
    }

    fn edge_cost(&self, cost: &CostVector) -> f64 {
        self.cost_position
            .and_then(|pos| cost.value(pos))
            .unwrap_or(1.0)
    }

    fn edge_width(&self, cost: &CostVector) -> f64 {
        self.width_position
            .and_then(|pos| cost.value(pos))
            .unwrap_or(f64::INFINITY)
    }
}

#[derive(Debug, Clone)]
pub struct SpfSearchResult<N> {
    pub route_map: SpfRouteMap<N>,
    pub target_reached: bool,
}

/// Label-correcting search from `root` over a topology snapshot.
///
/// With a `target` the search stops as soon as the target becomes permanent;
/// without one it settles every reachable node.
pub fn compute_route_map<N: NodeId>(
    topology: &Topology<N>,
    root: &N,
    target: Option<&N>,
    policy: SpfPolicy,
) -> Result<SpfSearchResult<N>> {
    if !topology.contains_node(root) {
        return Err(RouteComputeError::root_not_found(root));
    }
    let selection = MetricSelection::from_schema(topology.schema());

    let mut route_map: SpfRouteMap<N> = BTreeMap::new();
    let mut frontier = Frontier::new();

    route_map.insert(
        root.clone(),
        SpfState {
            cost: 0.0,
            width: f64::INFINITY,
            predecessor: None,
            label: Label::Permanent,
        },
    );
    frontier.push(SpfEntry {
        node: root.clone(),
        cost: 0.0,
        width: f64::INFINITY,
        policy,
    });

    let mut target_reached = false;
    let mut settled = 0usize;

    loop {
        let Some(entry) = frontier.pop_min(|entry: &SpfEntry<N>| {
            if entry.node == *root {
                return false;
            }
            match route_map.get(&entry.node) {
                Some(state) => state.label == Label::Permanent,
                None => true,
            }
        }) else {
            break;
        };

        let state = route_map
            .get_mut(&entry.node)
            .ok_or_else(|| RouteComputeError::node_not_found(&entry.node))?;
        state.label = Label::Permanent;
        let (cost_u, width_u) = (state.cost, state.width);
        settled += 1;
        trace!(node = ?entry.node, cost = cost_u, width = width_u, "settled");

        if target == Some(&entry.node) {
            target_reached = true;
            break;
        }

        let edges: &[Edge<N>] = topology
            .edges_from(&entry.node)
            .ok_or_else(|| RouteComputeError::node_not_found(&entry.node))?;
        for edge in edges {
            let cost = cost_u + selection.edge_cost(&edge.cost);
            let width = width_u.min(selection.edge_width(&edge.cost));

            match route_map.get_mut(&edge.destination) {
                None => {
                    route_map.insert(
                        edge.destination.clone(),
                        SpfState {
                            cost,
                            width,
                            predecessor: Some(entry.node.clone()),
                            label: Label::Tentative,
                        },
                    );
                }
                Some(next) if next.label == Label::Permanent => continue,
                Some(next) => {
                    if !policy_order(policy, (cost, width), (next.cost, next.width)).is_lt() {
                        continue;
                    }
                    next.cost = cost;
                    next.width = width;
                    next.predecessor = Some(entry.node.clone());
                }
            }
            frontier.push(SpfEntry {
                node: edge.destination.clone(),
                cost,
                width,
                policy,
            });
        }
    }

    debug!(
        root = ?root,
        ?policy,
        nodes = topology.node_count(),
        settled,
        labelled = route_map.len(),
        target_reached,
        "spf search finished"
    );

    Ok(SpfSearchResult {
        route_map,
        target_reached,
    })
}

/// Input of [`SpfComputeEngine`]: a topology snapshot and the search ends.
#[derive(Debug, Clone)]
pub struct SpfComputeInput<'a, N> {
    pub topology: &'a Topology<N>,
    pub root: N,
    pub target: Option<N>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SpfComputeEngine {
    pub policy: SpfPolicy,
}

impl<'a, N: NodeId> RouteComputeEngine<SpfComputeInput<'a, N>> for SpfComputeEngine {
    type Output = SpfSearchResult<N>;

    fn compute(&self, input: &SpfComputeInput<'a, N>) -> Result<Self::Output> {
        compute_route_map(
            input.topology,
            &input.root,
            input.target.as_ref(),
            self.policy,
        )
    }
}

/// Single-destination solver owning its topology and last results.
#[derive(Debug, Clone)]
pub struct ShortestPathSolver<N> {
    topology: Topology<N>,
    policy: SpfPolicy,
    root: Option<N>,
    route_map: SpfRouteMap<N>,
}

impl<N: NodeId> ShortestPathSolver<N> {
    pub fn new(schema: MetricSchema) -> Self {
        Self::with_topology(Topology::new(schema))
    }

    pub fn with_topology(topology: Topology<N>) -> Self {
        Self {
            topology,
            policy: SpfPolicy::default(),
            root: None,
            route_map: BTreeMap::new(),
        }
    }

    pub fn topology(&self) -> &Topology<N> {
        &self.topology
    }

    pub fn replace_topology(&mut self, topology: Topology<N>) {
        self.topology = topology;
        self.route_map.clear();
    }

    pub fn policy(&self) -> SpfPolicy {
        self.policy
    }

    /// Changing the policy or the root discards the last results.
    pub fn set_policy(&mut self, policy: SpfPolicy) {
        self.policy = policy;
        self.route_map.clear();
    }

    pub fn root(&self) -> Option<&N> {
        self.root.as_ref()
    }

    pub fn set_root(&mut self, root: N) {
        self.root = Some(root);
        self.route_map.clear();
    }

    pub fn add_edge(&mut self, origin: N, destination: N, cost: CostVector) -> Result<()> {
        if self.topology.add_edge(origin, destination, cost)? {
            self.route_map.clear();
        }
        Ok(())
    }

    pub fn add_link(&mut self, origin: N, destination: N, values: &[f64]) -> Result<()> {
        if self.topology.add_link(origin, destination, values)? {
            self.route_map.clear();
        }
        Ok(())
    }

    pub fn remove_edge(&mut self, origin: &N, destination: &N) -> Option<Edge<N>> {
        let removed = self.topology.remove_edge(origin, destination);
        if removed.is_some() {
            self.route_map.clear();
        }
        removed
    }

    pub fn get_edge(&self, origin: &N, destination: &N) -> Option<&Edge<N>> {
        self.topology.get_edge(origin, destination)
    }

    pub fn add_node(&mut self, node: N) {
        self.topology.add_node(node);
    }

    pub fn contains_node(&self, node: &N) -> bool {
        self.topology.contains_node(node)
    }

    /// Drops the topology and every computed route.
    pub fn clear(&mut self) {
        self.topology.clear();
        self.route_map.clear();
    }

    pub fn run(&mut self) -> Result<()> {
        self.search(None).map(|_| ())
    }

    /// Returns `false` when `target` is unreachable from the root.
    pub fn run_until(&mut self, target: &N) -> Result<bool> {
        self.search(Some(target))
    }

    fn search(&mut self, target: Option<&N>) -> Result<bool> {
        self.route_map.clear();
        let root = self.root.as_ref().ok_or(RouteComputeError::RootNotSet)?;
        let result = compute_route_map(&self.topology, root, target, self.policy)?;
        self.route_map = result.route_map;
        Ok(result.target_reached)
    }

    pub fn route_map(&self) -> &SpfRouteMap<N> {
        &self.route_map
    }

    /// Root-first path to `node`, or `None` if the last run never reached it.
    pub fn route(&self, node: &N) -> Result<Option<Path<N>>> {
        let Some(root) = self.root.as_ref() else {
            return Ok(None);
        };
        reconstruct_spf_path(&self.route_map, root, node)
    }

    pub fn routes(&self) -> Result<BTreeMap<N, Path<N>>> {
        let mut out = BTreeMap::new();
        let Some(root) = self.root.as_ref() else {
            return Ok(out);
        };
        for node in self.route_map.keys() {
            if let Some(path) = reconstruct_spf_path(&self.route_map, root, node)? {
                out.insert(node.clone(), path);
            }
        }
        Ok(out)
    }

    pub fn cost_to(&self, node: &N) -> Option<f64> {
        self.route_map.get(node).map(|state| state.cost)
    }

    pub fn width_to(&self, node: &N) -> Option<f64> {
        self.route_map.get(node).map(|state| state.width)
    }

    pub fn is_permanent(&self, node: &N) -> bool {
        self.route_map
            .get(node)
            .is_some_and(|state| state.label == Label::Permanent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> ShortestPathSolver<char> {
        let mut solver = ShortestPathSolver::new(MetricSchema::widest_shortest());
        solver.add_link('A', 'B', &[1.0, 10.0]).unwrap();
        solver.add_link('B', 'D', &[1.0, 10.0]).unwrap();
        solver.add_link('A', 'C', &[5.0, 2.0]).unwrap();
        solver.add_link('C', 'D', &[1.0, 2.0]).unwrap();
        solver.set_root('A');
        solver
    }

    #[test]
    fn basic_policy_finds_cheapest_route() {
        let mut solver = scenario();
        assert!(solver.run_until(&'D').unwrap());
        assert_eq!(solver.route(&'D').unwrap(), Some(vec!['A', 'B', 'D']));
        assert_eq!(solver.cost_to(&'D'), Some(2.0));
        assert_eq!(solver.width_to(&'D'), Some(10.0));
    }

    #[test]
    fn shortest_widest_prefers_wide_route_in_scenario() {
        let mut solver = scenario();
        solver.set_policy(SpfPolicy::ShortestWidest);
        assert!(solver.run_until(&'D').unwrap());
        assert_eq!(solver.route(&'D').unwrap(), Some(vec!['A', 'B', 'D']));
    }

    #[test]
    fn widest_shortest_breaks_cost_ties_by_width() {
        let mut solver = ShortestPathSolver::new(MetricSchema::widest_shortest());
        solver.add_link(1, 2, &[1.0, 5.0]).unwrap();
        solver.add_link(2, 4, &[1.0, 5.0]).unwrap();
        solver.add_link(1, 3, &[1.0, 10.0]).unwrap();
        solver.add_link(3, 4, &[1.0, 10.0]).unwrap();
        solver.set_root(1);

        solver.run().unwrap();
        assert_eq!(solver.route(&4).unwrap(), Some(vec![1, 2, 4]));

        solver.set_policy(SpfPolicy::WidestShortest);
        solver.run().unwrap();
        assert_eq!(solver.route(&4).unwrap(), Some(vec![1, 3, 4]));
        assert_eq!(solver.width_to(&4), Some(10.0));
    }

    #[test]
    fn shortest_widest_trades_cost_for_width() {
        let mut solver = ShortestPathSolver::new(MetricSchema::widest_shortest());
        solver.add_link(1, 2, &[1.0, 2.0]).unwrap();
        solver.add_link(2, 4, &[1.0, 2.0]).unwrap();
        solver.add_link(1, 3, &[3.0, 10.0]).unwrap();
        solver.add_link(3, 4, &[3.0, 10.0]).unwrap();
        solver.set_root(1);

        solver.set_policy(SpfPolicy::ShortestWidest);
        solver.run().unwrap();
        assert_eq!(solver.route(&4).unwrap(), Some(vec![1, 3, 4]));
        assert_eq!(solver.cost_to(&4), Some(6.0));

        solver.set_policy(SpfPolicy::Basic);
        solver.run().unwrap();
        assert_eq!(solver.route(&4).unwrap(), Some(vec![1, 2, 4]));
    }

    #[test]
    fn run_until_stops_at_target() {
        let mut solver = scenario();
        assert!(solver.run_until(&'B').unwrap());
        assert!(solver.is_permanent(&'B'));
        assert!(!solver.is_permanent(&'C'));
        assert_eq!(solver.route(&'B').unwrap(), Some(vec!['A', 'B']));
    }

    #[test]
    fn unreachable_target_reports_not_found() {
        let mut solver = scenario();
        solver.add_node('Z');
        assert!(!solver.run_until(&'Z').unwrap());
        assert_eq!(solver.route(&'Z').unwrap(), None);
    }

    #[test]
    fn missing_root_is_fatal() {
        let mut solver = scenario();
        solver.set_root('Q');
        assert_eq!(
            solver.run(),
            Err(RouteComputeError::RootNotFound("'Q'".to_string()))
        );

        let mut unrooted: ShortestPathSolver<u32> =
            ShortestPathSolver::new(MetricSchema::widest_shortest());
        assert_eq!(unrooted.run(), Err(RouteComputeError::RootNotSet));
    }

    #[test]
    fn removing_inbound_edges_disconnects_node() {
        let mut solver = scenario();
        solver.run().unwrap();
        assert!(solver.route(&'D').unwrap().is_some());

        assert!(solver.remove_edge(&'B', &'D').is_some());
        assert!(solver.route_map().is_empty());
        assert!(solver.remove_edge(&'C', &'D').is_some());
        solver.run().unwrap();
        assert_eq!(solver.route(&'D').unwrap(), None);
        assert!(solver.route(&'C').unwrap().is_some());
    }

    #[test]
    fn rerun_is_idempotent() {
        let mut solver = scenario();
        solver.run().unwrap();
        let first = solver.routes().unwrap();
        let first_map = solver.route_map().clone();
        solver.run().unwrap();
        assert_eq!(solver.routes().unwrap(), first);
        assert_eq!(solver.route_map(), &first_map);
        assert_eq!(first.len(), 4);
        assert_eq!(first.get(&'A'), Some(&vec!['A']));
    }

    #[test]
    fn sink_node_can_be_root() {
        let mut solver = scenario();
        solver.set_root('D');
        solver.run().unwrap();
        assert_eq!(solver.routes().unwrap().len(), 1);
    }

    #[test]
    fn engine_trait_runs_on_snapshot() {
        let solver = scenario();
        let engine = SpfComputeEngine {
            policy: SpfPolicy::Basic,
        };
        let result = engine
            .compute(&SpfComputeInput {
                topology: solver.topology(),
                root: 'A',
                target: Some('D'),
            })
            .unwrap();
        assert!(result.target_reached);
        assert!(solver.route_map().is_empty());
    }

    #[test]
    fn changing_root_or_policy_discards_routes() {
        let mut solver = scenario();
        solver.run().unwrap();
        assert_eq!(solver.route(&'D').unwrap(), Some(vec!['A', 'B', 'D']));

        solver.set_root('B');
        assert_eq!(solver.route(&'D').unwrap(), None);
        assert!(solver.routes().unwrap().is_empty());
        solver.run().unwrap();
        assert_eq!(solver.route(&'D').unwrap(), Some(vec!['B', 'D']));

        solver.set_policy(SpfPolicy::ShortestWidest);
        assert!(solver.route_map().is_empty());
        assert_eq!(solver.cost_to(&'D'), None);
    }
}
