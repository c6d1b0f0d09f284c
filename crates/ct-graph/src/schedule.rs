//! Same-instant dependency scheduling.
//!
//! A non-delayed connection `producer -> consumer` is a same-instant edge when
//! the consumer has direct feedthrough, or when both ends are state-output
//! components. Every cycle in that graph is therefore either an algebraic loop
//! or a delay-free loop of integrators; both are configuration errors.
//!
//! The order is a Kahn topological sort where ties are broken by insertion
//! order, so the same topology always yields the same order.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ct_core::CompId;
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::network::{Coupling, Feedthrough, Network};

/// Same-instant dependency edges as `(producer_slot, consumer_slot)`, sorted
/// and deduplicated.
pub fn dependency_edges(net: &Network) -> Vec<(usize, usize)> {
    let mut edges: Vec<(usize, usize)> = net
        .connections()
        .iter()
        .filter(|c| c.coupling == Coupling::Direct)
        .filter_map(|c| {
            let producer = net.component(net.port(c.from)?.comp)?;
            let consumer = net.component(net.port(c.to)?.comp)?;
            let same_instant = match (producer.feedthrough, consumer.feedthrough) {
                (_, Feedthrough::Direct) => true,
                (Feedthrough::StateOnly, Feedthrough::StateOnly) => true,
                (Feedthrough::Direct, Feedthrough::StateOnly) => false,
            };
            same_instant.then_some((producer.id.slot(), consumer.id.slot()))
        })
        .collect();
    edges.sort_unstable();
    edges.dedup();
    edges
}

/// Compute an evaluation order in which every component follows all of its
/// same-instant dependencies.
///
/// Fails with [`GraphError::CyclicDependency`] naming the components of one
/// cycle when no such order exists.
pub fn compute_order(net: &Network) -> GraphResult<Vec<CompId>> {
    let n = net.components().len();
    let edges = dependency_edges(net);

    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_degree = vec![0_usize; n];
    for &(from, to) in &edges {
        successors[from].push(to);
        in_degree[to] += 1;
    }

    // Min-heap on slot index: among ready components, the earliest added goes first
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, deg)| **deg == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(n);
    while let Some(Reverse(slot)) = ready.pop() {
        order.push(net.components()[slot].id);
        for &next in &successors[slot] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    if order.len() != n {
        let cycle = find_cycle(n, &edges, &in_degree);
        let chain: Vec<CompId> = cycle.iter().map(|&s| net.components()[s].id).collect();
        let names = chain
            .iter()
            .map(|&id| net.component_name(id).to_string())
            .collect();
        return Err(GraphError::CyclicDependency { chain, names });
    }

    Ok(order)
}

/// Extract one cycle from the components Kahn's algorithm could not place.
///
/// Every unplaced component still has an unplaced predecessor, so walking
/// predecessors from any of them must revisit a component.
fn find_cycle(n: usize, edges: &[(usize, usize)], in_degree: &[usize]) -> Vec<usize> {
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(from, to) in edges {
        if in_degree[from] > 0 && in_degree[to] > 0 {
            predecessors[to].push(from);
        }
    }

    let Some(start) = (0..n).find(|&i| in_degree[i] > 0) else {
        return Vec::new();
    };

    let mut seen_at: Vec<Option<usize>> = vec![None; n];
    let mut path = Vec::new();
    let mut current = start;
    loop {
        if let Some(pos) = seen_at[current] {
            let mut cycle = path.split_off(pos);
            cycle.reverse();
            if let Some(min_pos) = cycle
                .iter()
                .enumerate()
                .min_by_key(|(_, s)| **s)
                .map(|(p, _)| p)
            {
                cycle.rotate_left(min_pos);
            }
            return cycle;
        }
        seen_at[current] = Some(path.len());
        path.push(current);
        match predecessors[current].iter().min() {
            Some(&prev) => current = prev,
            None => return path,
        }
    }
}

/// A computed evaluation order, tagged with the topology revision it was
/// computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    order: Vec<CompId>,
    revision: u64,
}

impl Schedule {
    /// Components in evaluation order.
    pub fn order(&self) -> &[CompId] {
        &self.order
    }

    /// Topology revision this order belongs to.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Position of a component in the order.
    pub fn position(&self, comp: CompId) -> Option<usize> {
        self.order.iter().position(|&c| c == comp)
    }
}

/// Owner of the cached evaluation order.
///
/// The order is recomputed only when the network revision changes or the
/// cache is explicitly invalidated. The cache keys on the revision of a
/// single network lineage (one builder and its rebuilds).
#[derive(Debug, Default)]
pub struct Scheduler {
    cache: Option<Schedule>,
    rebuilds: u64,
}

impl Scheduler {
    /// Create a scheduler with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the evaluation order for `net`, recomputing it only if the
    /// cached one is missing or stale.
    pub fn schedule(&mut self, net: &Network) -> GraphResult<&Schedule> {
        let schedule = match self.cache.take() {
            Some(cached) if cached.revision == net.revision() => cached,
            _ => {
                let order = compute_order(net)?;
                self.rebuilds += 1;
                debug!(
                    revision = net.revision(),
                    components = order.len(),
                    rebuilds = self.rebuilds,
                    "rebuilt evaluation schedule"
                );
                Schedule {
                    order,
                    revision: net.revision(),
                }
            }
        };
        Ok(self.cache.insert(schedule))
    }

    /// The cached order, if one is present.
    pub fn cached(&self) -> Option<&Schedule> {
        self.cache.as_ref()
    }

    /// Drop the cached order; the next `schedule` call recomputes it.
    pub fn invalidate(&mut self) {
        if self.cache.take().is_some() {
            debug!("evaluation schedule invalidated");
        }
    }

    /// How many times the order has been computed.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }
}
