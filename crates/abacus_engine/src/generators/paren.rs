//! Elision of redundant parentheses.

use abacus_ast::{OpKind, Store};

use crate::cost::CostModel;
use crate::generator::{CandKind, Candidate, Rewrite, RewriteGen};
use crate::model::{Model, Transform};

/// Strips `( x )` down to `x` when the group wraps a single ref.
pub struct ParenGen;

impl RewriteGen for ParenGen {
    fn name(&self) -> &'static str {
        "paren"
    }

    fn candidates(&self, store: &Store, _costs: &CostModel, model: &Model) -> Vec<Candidate> {
        let mut out = Vec::new();
        for (at, &id) in model.refs.iter().enumerate() {
            if trivial_group(store, id).is_some() {
                out.push(Candidate {
                    local_cost: 1,
                    kind: CandKind::Site { at },
                });
            }
        }
        out
    }

    fn build(
        &self,
        store: &mut Store,
        _costs: &CostModel,
        model: &Model,
        cand: &Candidate,
    ) -> Result<Option<Rewrite>, abacus_ast::InternError> {
        let CandKind::Site { at } = cand.kind else {
            return Ok(None);
        };
        let refs = &model.refs;
        if at >= refs.len() {
            return Ok(None);
        }
        let Some(inner) = trivial_group(store, refs[at]) else {
            return Ok(None);
        };
        let mut out = refs.clone();
        out[at] = inner;
        Ok(Some(Rewrite {
            transform: Transform::ElideParens,
            refs: out,
            result: Some(inner),
        }))
    }
}

/// The single ref inside a `( x )` group, if that is the whole group.
fn trivial_group(store: &Store, id: abacus_ast::RefId) -> Option<abacus_ast::RefId> {
    let children = store.children(id)?;
    let &[lp, inner, rp] = children else {
        return None;
    };
    (store.op_kind(lp) == Some(OpKind::LParen)
        && store.op_kind(rp) == Some(OpKind::RParen)
        && !store.is_op(inner))
    .then_some(inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_single_ref_group_is_stripped() {
        let mut store = Store::new();
        let costs = CostModel::default();
        let refs = abacus_parser::parse(&mut store, "(x) + 5").unwrap();
        let model = Rc::new(Model::root(refs, 0));
        let gen = ParenGen;
        let cands = gen.candidates(&store, &costs, &model);
        assert_eq!(cands.len(), 1);
        let rw = gen.build(&mut store, &costs, &model, &cands[0]).unwrap().unwrap();
        assert_eq!(rw.transform, Transform::ElideParens);
        assert!(matches!(store.get(rw.refs[0]), abacus_ast::Ref::Variable(v) if v == "x"));
    }

    #[test]
    fn test_wider_groups_are_kept() {
        let mut store = Store::new();
        let costs = CostModel::default();
        let refs = abacus_parser::parse(&mut store, "(1 + 2) + 5").unwrap();
        let model = Rc::new(Model::root(refs, 0));
        assert!(ParenGen.candidates(&store, &costs, &model).is_empty());
    }
}
