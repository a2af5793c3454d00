use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{trace, warn};

use super::{CostVector, MetricSchema, NodeId, Result};

/// Directed link owned by the adjacency list of its origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge<N> {
    pub destination: N,
    pub cost: CostVector,
}

/// Adjacency-list topology. Every cost vector follows the topology's schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology<N> {
    schema: MetricSchema,
    links: BTreeMap<N, Vec<Edge<N>>>,
}

impl<N: NodeId> Topology<N> {
    pub fn new(schema: MetricSchema) -> Self {
        Self {
            schema,
            links: BTreeMap::new(),
        }
    }

    pub fn schema(&self) -> &MetricSchema {
        &self.schema
    }

    /// Registers a node without links. Returns `false` if it already existed.
    pub fn add_node(&mut self, node: N) -> bool {
        if self.links.contains_key(&node) {
            return false;
        }
        self.links.insert(node, Vec::new());
        true
    }

    /// Inserts `origin -> destination`, or replaces the cost of the existing
    /// edge. Returns `true` when the topology changed.
    pub fn add_edge(&mut self, origin: N, destination: N, cost: CostVector) -> Result<bool> {
        if let Err(err) = self.schema.validate(&cost) {
            warn!(origin = ?origin, destination = ?destination, %err, "edge rejected");
            return Err(err);
        }
        self.add_node(destination.clone());

        let edges = self.links.entry(origin).or_default();
        if let Some(edge) = edges.iter_mut().find(|edge| edge.destination == destination) {
            if edge.cost == cost {
                return Ok(false);
            }
            trace!(destination = ?destination, "edge cost updated");
            edge.cost = cost;
            return Ok(true);
        }
        edges.push(Edge { destination, cost });
        Ok(true)
    }

    /// Like [`Topology::add_edge`] with raw values tagged by the schema.
    pub fn add_link(&mut self, origin: N, destination: N, values: &[f64]) -> Result<bool> {
        let cost = self.schema.tag(values)?;
        self.add_edge(origin, destination, cost)
    }

    /// Inserts the link in both directions with the same cost.
    pub fn add_bidirectional_link(&mut self, a: N, b: N, values: &[f64]) -> Result<bool> {
        let forward = self.add_link(a.clone(), b.clone(), values)?;
        let backward = self.add_link(b, a, values)?;
        Ok(forward || backward)
    }

    pub fn remove_edge(&mut self, origin: &N, destination: &N) -> Option<Edge<N>> {
        let edges = self.links.get_mut(origin)?;
        let idx = edges.iter().position(|edge| edge.destination == *destination)?;
        Some(edges.swap_remove(idx))
    }

    pub fn get_edge(&self, origin: &N, destination: &N) -> Option<&Edge<N>> {
        self.links
            .get(origin)?
            .iter()
            .find(|edge| edge.destination == *destination)
    }

    pub fn edges_from(&self, node: &N) -> Option<&[Edge<N>]> {
        self.links.get(node).map(Vec::as_slice)
    }

    pub fn contains_node(&self, node: &N) -> bool {
        self.links.contains_key(node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.links.keys()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&N, &Edge<N>)> {
        self.links
            .iter()
            .flat_map(|(origin, edges)| edges.iter().map(move |edge| (origin, edge)))
    }

    pub fn node_count(&self) -> usize {
        self.links.len()
    }

    pub fn edge_count(&self) -> usize {
        self.links.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn clear(&mut self) {
        self.links.clear();
    }
}
