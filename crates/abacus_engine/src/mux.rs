//! K-way merge of the generators' candidate streams.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use abacus_ast::Store;

use crate::cost::{Cost, CostModel};
use crate::generator::{Candidate, RewriteGen};
use crate::model::Model;

/// Merges the per-generator candidate lists into one sequence ordered by
/// local cost. Because every successor shares the parent's accumulated
/// cost, local order *is* successor-total order. Ties break by generator
/// index, then by position within the generator — stable, so a fixed
/// input always expands identically.
pub struct ActionMux {
    streams: Vec<Vec<Candidate>>,
    heap: BinaryHeap<Reverse<(Cost, usize, usize)>>,
}

impl ActionMux {
    pub fn new(
        generators: &[Box<dyn RewriteGen>],
        store: &Store,
        costs: &CostModel,
        model: &Model,
    ) -> Self {
        let streams: Vec<Vec<Candidate>> = generators
            .iter()
            .map(|g| g.candidates(store, costs, model))
            .collect();
        let mut heap = BinaryHeap::with_capacity(streams.len());
        for (gi, stream) in streams.iter().enumerate() {
            if let Some(head) = stream.first() {
                heap.push(Reverse((head.local_cost, gi, 0)));
            }
        }
        ActionMux { streams, heap }
    }

    /// The globally cheapest remaining candidate, with its generator.
    pub fn next(&mut self) -> Option<(usize, Candidate)> {
        let Reverse((_, gi, pos)) = self.heap.pop()?;
        let cand = self.streams[gi][pos].clone();
        if let Some(next) = self.streams[gi].get(pos + 1) {
            self.heap.push(Reverse((next.local_cost, gi, pos + 1)));
        }
        Some((gi, cand))
    }
}
