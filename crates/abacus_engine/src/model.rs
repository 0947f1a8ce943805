//! Immutable search-graph nodes.

use std::fmt;
use std::rc::Rc;

use abacus_ast::RefId;

use crate::cost::Cost;

/// Label of the rewrite that produced a model. Diagnostic only; never
/// part of the state key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    Initial,
    MergeNumbers,
    CombineTerms,
    AggregateExprs,
    CancelZero,
    MultiplyNumbers,
    ScaleVariable,
    MultiplyPowers,
    DivideNumbers,
    DividePowers,
    CancelPair,
    Cleanup,
    SubToAdd,
    ElideParens,
    Materialize,
}

impl Transform {
    pub fn label(self) -> &'static str {
        match self {
            Transform::Initial => "initial",
            Transform::MergeNumbers => "merge_numbers",
            Transform::CombineTerms => "combine_terms",
            Transform::AggregateExprs => "aggregate_exprs",
            Transform::CancelZero => "cancel_zero",
            Transform::MultiplyNumbers => "multiply_numbers",
            Transform::ScaleVariable => "scale_variable",
            Transform::MultiplyPowers => "multiply_powers",
            Transform::DivideNumbers => "divide_numbers",
            Transform::DividePowers => "divide_powers",
            Transform::CancelPair => "cancel_pair",
            Transform::Cleanup => "cleanup",
            Transform::SubToAdd => "sub_to_add",
            Transform::ElideParens => "elide_parens",
            Transform::Materialize => "materialize",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One node of the search graph.
///
/// Models are immutable once built; the parent link is what the driver
/// walks to reconstruct a solution path. Two models with the same `refs`
/// are the same state regardless of how they were reached — the refs
/// vector itself is the state key, since the store hash-conses.
#[derive(Debug)]
pub struct Model {
    pub parent: Option<Rc<Model>>,
    pub transform: Transform,
    pub refs: Vec<RefId>,
    /// Summed rewrite cost from the root.
    pub cost_so_far: Cost,
    /// `cost_so_far` plus the heuristic residual; the frontier priority.
    pub est_total: Cost,
    /// Composite (or replacement ref) created by the rewrite, when any.
    pub result: Option<RefId>,
}

impl Model {
    pub fn root(refs: Vec<RefId>, residual: Cost) -> Self {
        Model {
            parent: None,
            transform: Transform::Initial,
            refs,
            cost_so_far: 0,
            est_total: residual,
            result: None,
        }
    }

    pub fn child(
        parent: &Rc<Model>,
        transform: Transform,
        refs: Vec<RefId>,
        local_cost: Cost,
        result: Option<RefId>,
        residual: Cost,
    ) -> Self {
        let cost_so_far = parent.cost_so_far + local_cost;
        Model {
            parent: Some(Rc::clone(parent)),
            transform,
            refs,
            cost_so_far,
            est_total: cost_so_far + residual,
            result,
        }
    }

    /// Root-to-here path via parent links.
    pub fn path(self: &Rc<Model>) -> Vec<Rc<Model>> {
        let mut path = Vec::new();
        let mut cursor = Some(Rc::clone(self));
        while let Some(model) = cursor {
            cursor = model.parent.clone();
            path.push(model);
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_accumulates_cost() {
        let root = Rc::new(Model::root(vec![], 3));
        assert_eq!(root.est_total, 3);
        let child = Model::child(&root, Transform::Cleanup, vec![], 1, None, 2);
        assert_eq!(child.cost_so_far, 1);
        assert_eq!(child.est_total, 3);
    }

    #[test]
    fn test_path_runs_root_to_leaf() {
        let root = Rc::new(Model::root(vec![], 0));
        let mid = Rc::new(Model::child(&root, Transform::Cleanup, vec![], 1, None, 0));
        let leaf = Rc::new(Model::child(&mid, Transform::Materialize, vec![], 1, None, 0));
        let path = leaf.path();
        assert_eq!(path.len(), 3);
        assert_eq!(path[0].transform, Transform::Initial);
        assert_eq!(path[2].transform, Transform::Materialize);
    }
}
