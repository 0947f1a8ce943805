//! The best-first search driver.
//!
//! Phase A pops the frontier's cheapest model (precomputed f-score:
//! accumulated cost plus heuristic), expands it through the action
//! multiplexer, and deduplicates states on their ref sequences. When the
//! frontier drains, phase B materializes the lazy composite values of
//! the stranded end-of-chain models and reopens the search; when even
//! that changes nothing, there is no solution.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use abacus_ast::{RefId, Store};
use rustc_hash::FxHashSet;
use tracing::{debug, trace, warn};

use crate::cost::{Cost, CostModel};
use crate::error::EngineError;
use crate::generator::RewriteGen;
use crate::generators::default_generators;
use crate::goal::is_goal;
use crate::heuristic::heuristic;
use crate::model::{Model, Transform};
use crate::mux::ActionMux;

/// External stop signal, polled between frontier pops.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::Relaxed)
    }
}

/// Knobs for one `search` call.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Branches whose accumulated cost exceeds this are abandoned.
    pub cost_ceiling: Option<Cost>,
    /// Upper bound on frontier pops; exhaustion reads as no solution.
    pub step_limit: Option<usize>,
    pub cancel: Option<CancelToken>,
}

/// Result of a search.
#[derive(Debug)]
pub enum Outcome {
    /// Root-to-goal path.
    Solved(Vec<Rc<Model>>),
    NoSolution,
    Cancelled,
}

struct FrontierEntry {
    priority: Cost,
    seq: u64,
    model: Rc<Model>,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    // Reversed: BinaryHeap is a max-heap and we want the cheapest entry
    // first, oldest first among equals.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Owns the store, the cost table, and the generator set for one search.
pub struct Searcher {
    pub store: Store,
    costs: CostModel,
    generators: Vec<Box<dyn RewriteGen>>,
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Searcher {
    pub fn new() -> Self {
        Self::with_costs(CostModel::default())
    }

    pub fn with_costs(costs: CostModel) -> Self {
        Searcher {
            store: Store::new(),
            costs,
            generators: default_generators(),
        }
    }

    pub fn costs(&self) -> &CostModel {
        &self.costs
    }

    /// Parse expression text into the root model of a search.
    pub fn parse_initial_model(&mut self, text: &str) -> Result<Rc<Model>, EngineError> {
        let refs = abacus_parser::parse(&mut self.store, text)?;
        let residual = heuristic(&self.store, &self.costs, &refs);
        Ok(Rc::new(Model::root(refs, residual)))
    }

    /// Expanded human-readable rendering of a model's state.
    pub fn render(&self, model: &Model) -> String {
        format!(
            "{}",
            abacus_ast::DisplaySeq {
                store: &self.store,
                refs: &model.refs,
            }
        )
    }

    /// Stable diagnostic rendering of a solution path.
    pub fn format_path(&self, path: &[Rc<Model>]) -> String {
        crate::format::format_path(&self.store, path)
    }

    /// Run the search from `root` until a goal form is found, the state
    /// space is exhausted, or the caller stops it.
    pub fn search(
        &mut self,
        root: Rc<Model>,
        options: &SearchOptions,
    ) -> Result<Outcome, EngineError> {
        let mut frontier = BinaryHeap::new();
        let mut visited: FxHashSet<Vec<RefId>> = FxHashSet::default();
        let mut end_of_chain: Vec<Rc<Model>> = Vec::new();
        let mut seq: u64 = 0;
        let mut steps: usize = 0;

        frontier.push(FrontierEntry {
            priority: root.est_total,
            seq,
            model: root,
        });

        loop {
            // Phase A: best-first expansion.
            while let Some(entry) = frontier.pop() {
                if let Some(token) = &options.cancel {
                    if token.is_cancelled() {
                        debug!(steps, "search cancelled");
                        return Ok(Outcome::Cancelled);
                    }
                }
                if let Some(limit) = options.step_limit {
                    if steps >= limit {
                        debug!(limit, "step limit exhausted");
                        return Ok(Outcome::NoSolution);
                    }
                }
                steps += 1;

                let model = entry.model;
                if !visited.insert(model.refs.clone()) {
                    continue;
                }
                if is_goal(&self.store, &model.refs) {
                    debug!(steps, cost = model.cost_so_far, "goal reached");
                    return Ok(Outcome::Solved(model.path()));
                }

                let pushed =
                    self.expand(&model, &mut frontier, &visited, &mut seq, options)?;
                if pushed == 0 {
                    end_of_chain.push(model);
                }
            }

            // Phase B: deferred compute. Lift the lazy values of the
            // stranded models and reopen the search with whatever moved.
            let mut reopened = 0usize;
            for model in end_of_chain.drain(..) {
                let Some(refs) = materialize(&mut self.store, &model.refs) else {
                    continue;
                };
                let residual = heuristic(&self.store, &self.costs, &refs);
                let child = Rc::new(Model::child(
                    &model,
                    Transform::Materialize,
                    refs,
                    self.costs.add_single_digit,
                    None,
                    residual,
                ));
                if let Some(ceiling) = options.cost_ceiling {
                    if child.cost_so_far > ceiling {
                        continue;
                    }
                }
                if !visited.contains(&child.refs) {
                    seq += 1;
                    frontier.push(FrontierEntry {
                        priority: child.est_total,
                        seq,
                        model: child,
                    });
                    reopened += 1;
                }
            }
            if reopened == 0 {
                debug!(steps, "frontier exhausted");
                return Ok(Outcome::NoSolution);
            }
            trace!(reopened, "deferred compute reopened the search");
        }
    }

    fn expand(
        &mut self,
        model: &Rc<Model>,
        frontier: &mut BinaryHeap<FrontierEntry>,
        visited: &FxHashSet<Vec<RefId>>,
        seq: &mut u64,
        options: &SearchOptions,
    ) -> Result<usize, EngineError> {
        let mut mux = ActionMux::new(&self.generators, &self.store, &self.costs, model);
        let mut blocked = vec![false; self.generators.len()];
        let mut last_priority: Vec<Option<Cost>> = vec![None; self.generators.len()];
        let mut pushed = 0usize;

        while let Some((gi, cand)) = mux.next() {
            if blocked[gi] {
                continue;
            }
            let gen = &self.generators[gi];
            let Some(rewrite) = gen.build(&mut self.store, &self.costs, model, &cand)? else {
                warn!(generator = gen.name(), "candidate no longer matches, skipping");
                continue;
            };
            let residual = heuristic(&self.store, &self.costs, &rewrite.refs);
            let child = Model::child(
                model,
                rewrite.transform,
                rewrite.refs,
                cand.local_cost,
                rewrite.result,
                residual,
            );

            // Keep taking from this generator only while its successors
            // keep strictly improving; the rewrites it still holds stay
            // reachable from the children. A heuristic bias, not part of
            // the correctness argument.
            if let Some(prev) = last_priority[gi] {
                if child.est_total >= prev {
                    blocked[gi] = true;
                    continue;
                }
            }
            last_priority[gi] = Some(child.est_total);

            if let Some(ceiling) = options.cost_ceiling {
                if child.cost_so_far > ceiling {
                    trace!(cost = child.cost_so_far, "branch over the cost ceiling");
                    continue;
                }
            }
            if visited.contains(&child.refs) {
                continue;
            }
            trace!(
                transform = child.transform.label(),
                cost = child.cost_so_far,
                priority = child.est_total,
                "push"
            );
            *seq += 1;
            frontier.push(FrontierEntry {
                priority: child.est_total,
                seq: *seq,
                model: Rc::new(child),
            });
            pushed += 1;
        }
        Ok(pushed)
    }
}

/// Replace every top-level composite whose value is now defined with a
/// concrete number ref. `None` when nothing changed.
fn materialize(store: &mut Store, refs: &[RefId]) -> Option<Vec<RefId>> {
    let mut changed = false;
    let mut out = Vec::with_capacity(refs.len());
    for &id in refs {
        if store.children(id).is_some() {
            if let Some(value) = store.value(id) {
                out.push(store.num(value));
                changed = true;
                continue;
            }
        }
        out.push(id);
    }
    changed.then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(text: &str) -> (Searcher, Outcome) {
        let mut searcher = Searcher::new();
        let root = searcher.parse_initial_model(text).unwrap();
        let outcome = searcher.search(root, &SearchOptions::default()).unwrap();
        (searcher, outcome)
    }

    #[test]
    fn test_already_canonical_input_solves_immediately() {
        let (_, outcome) = solve("5 + x");
        let Outcome::Solved(path) = outcome else {
            panic!("expected a solution");
        };
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].transform, Transform::Initial);
    }

    #[test]
    fn test_materialize_lifts_only_defined_composites() {
        let mut searcher = Searcher::new();
        let refs = abacus_parser::parse(&mut searcher.store, "(3 * 4) + 5 * y").unwrap();
        let lifted = materialize(&mut searcher.store, &refs).unwrap();
        assert_eq!(searcher.store.as_number(lifted[0]), Some(12));
        // The scaled variable is untouched.
        assert_eq!(lifted[2..], refs[2..]);
    }

    #[test]
    fn test_cancellation_is_observed_between_pops() {
        let token = CancelToken::new();
        token.cancel();
        let mut searcher = Searcher::new();
        let root = searcher.parse_initial_model("2 + 3 + 4").unwrap();
        let options = SearchOptions {
            cancel: Some(token),
            ..Default::default()
        };
        let outcome = searcher.search(root, &options).unwrap();
        assert!(matches!(outcome, Outcome::Cancelled));
    }

    #[test]
    fn test_step_limit_reads_as_no_solution() {
        let mut searcher = Searcher::new();
        let root = searcher.parse_initial_model("2 + 3 + 4").unwrap();
        let options = SearchOptions {
            step_limit: Some(1),
            ..Default::default()
        };
        let outcome = searcher.search(root, &options).unwrap();
        assert!(matches!(outcome, Outcome::NoSolution));
    }

    #[test]
    fn test_unresolvable_state_is_no_solution() {
        // Nothing combines x * y in this system.
        let (_, outcome) = solve("x * y");
        assert!(matches!(outcome, Outcome::NoSolution));
    }
}
