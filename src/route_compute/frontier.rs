use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::{CostVector, NodeId, SpfPolicy};

/// Orders `(cost, width)` labels under a policy. `Less` means `a` is better.
pub fn policy_order(policy: SpfPolicy, a: (f64, f64), b: (f64, f64)) -> Ordering {
    let (cost_a, width_a) = a;
    let (cost_b, width_b) = b;
    match policy {
        SpfPolicy::Basic => cost_a.total_cmp(&cost_b),
        SpfPolicy::WidestShortest => cost_a
            .total_cmp(&cost_b)
            .then_with(|| width_b.total_cmp(&width_a)),
        SpfPolicy::ShortestWidest => width_b
            .total_cmp(&width_a)
            .then_with(|| cost_a.total_cmp(&cost_b)),
    }
}

#[derive(Debug, Clone)]
pub struct SpfEntry<N> {
    pub node: N,
    pub cost: f64,
    pub width: f64,
    pub policy: SpfPolicy,
}

impl<N: NodeId> PartialEq for SpfEntry<N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N: NodeId> Eq for SpfEntry<N> {}

impl<N: NodeId> Ord for SpfEntry<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        policy_order(
            self.policy,
            (self.cost, self.width),
            (other.cost, other.width),
        )
        .then_with(|| self.node.cmp(&other.node))
    }
}

impl<N: NodeId> PartialOrd for SpfEntry<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone)]
pub struct SlotEntry<N> {
    pub node: N,
    pub slot: usize,
    pub cost: CostVector,
}

impl<N: NodeId> PartialEq for SlotEntry<N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N: NodeId> Eq for SlotEntry<N> {}

impl<N: NodeId> Ord for SlotEntry<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .lexicographic_cmp(&other.cost)
            .then_with(|| self.node.cmp(&other.node))
            .then_with(|| self.slot.cmp(&other.slot))
    }
}

impl<N: NodeId> PartialOrd for SlotEntry<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of candidate entries with lazy deletion of stale ones.
#[derive(Debug, Clone)]
pub struct Frontier<E> {
    heap: BinaryHeap<Reverse<E>>,
}

impl<E: Ord> Default for Frontier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Ord> Frontier<E> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, entry: E) {
        self.heap.push(Reverse(entry));
    }

    /// Pops the best entry for which `is_stale` returns `false`.
    pub fn pop_min<F>(&mut self, mut is_stale: F) -> Option<E>
    where
        F: FnMut(&E) -> bool,
    {
        while let Some(Reverse(entry)) = self.heap.pop() {
            if is_stale(&entry) {
                continue;
            }
            return Some(entry);
        }
        None
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
