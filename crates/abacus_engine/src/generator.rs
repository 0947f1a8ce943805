//! The rewrite-generator protocol.
//!
//! Generators enumerate their rewrites in two steps: `candidates` lists
//! every applicable site with its local cost (read-only, already sorted
//! by cost), and `build` materializes a single successor. The split lets
//! the multiplexer order successors across generators before any
//! interning is paid for, and keeps store writes confined to model
//! construction.

use abacus_ast::{InternError, RefId, Store};

use crate::cost::{Cost, CostModel};
use crate::model::{Model, Transform};

/// One enumerated rewrite: where it applies and what it costs locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub local_cost: Cost,
    pub kind: CandKind,
}

/// Site data for a candidate, interpreted by the generator that made it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandKind {
    /// Two additive term positions (sum, cancel).
    TermPair { i: usize, j: usize },
    /// Index of the operator in an adjacent `(L, op, R)` triple (mul, div).
    Triple { at: usize },
    /// A single ref position (sub-to-add, paren elision).
    Site { at: usize },
    /// The head of the sequence (cleanup).
    Lead,
}

/// A materialized rewrite.
#[derive(Debug)]
pub struct Rewrite {
    pub transform: Transform,
    pub refs: Vec<RefId>,
    pub result: Option<RefId>,
}

pub trait RewriteGen {
    fn name(&self) -> &'static str;

    /// Applicable rewrites of `model`, in non-decreasing local cost.
    /// Must not mutate anything and must be deterministic for a given
    /// model. May be empty.
    fn candidates(&self, store: &Store, costs: &CostModel, model: &Model) -> Vec<Candidate>;

    /// Materialize one candidate as a successor description.
    ///
    /// `Ok(None)` means the candidate no longer matches the shape the
    /// generator expected — the driver drops it and moves on. The only
    /// error is symbol-cache exhaustion, which is fatal.
    fn build(
        &self,
        store: &mut Store,
        costs: &CostModel,
        model: &Model,
        cand: &Candidate,
    ) -> Result<Option<Rewrite>, InternError>;
}
