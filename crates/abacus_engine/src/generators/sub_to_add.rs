//! Rewriting of interior `- n` into `+ (-n)`.

use abacus_ast::{OpKind, Store};

use crate::cost::CostModel;
use crate::generator::{CandKind, Candidate, Rewrite, RewriteGen};
use crate::model::{Model, Transform};

/// Turns `… - n …` into `… + (-n) …` for numeric `n`. Idempotent on its
/// own outputs: once the sign has moved into the number there is no `-`
/// left to rewrite at that site.
pub struct SubToAddGen;

impl RewriteGen for SubToAddGen {
    fn name(&self) -> &'static str {
        "sub_to_add"
    }

    fn candidates(&self, store: &Store, _costs: &CostModel, model: &Model) -> Vec<Candidate> {
        let refs = &model.refs;
        let mut out = Vec::new();
        for at in 1..refs.len().saturating_sub(1) {
            if store.op_kind(refs[at]) == Some(OpKind::Sub)
                && store.as_number(refs[at + 1]).is_some()
            {
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
        if at + 1 >= refs.len() || store.op_kind(refs[at]) != Some(OpKind::Sub) {
            return Ok(None);
        }
        let Some(n) = store.as_number(refs[at + 1]) else {
            return Ok(None);
        };
        let Some(negated) = n.checked_neg() else {
            return Ok(None);
        };
        let mut out = refs.clone();
        out[at] = store.op(OpKind::Add);
        let replacement = store.num(negated);
        out[at + 1] = replacement;
        Ok(Some(Rewrite {
            transform: Transform::SubToAdd,
            refs: out,
            result: Some(replacement),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abacus_ast::RefId;
    use std::rc::Rc;

    // These states never come out of the parser (it normalizes `- T`
    // away); they are built by hand, the way a host embedding its own
    // front end might produce them.
    fn raw_sub_state(store: &mut Store) -> Rc<Model> {
        let five = store.num(5);
        let sub = store.op(OpKind::Sub);
        let three = store.num(3);
        Rc::new(Model::root(vec![five, sub, three], 0))
    }

    fn apply_all(store: &mut Store, model: &Rc<Model>) -> Vec<Vec<RefId>> {
        let costs = CostModel::default();
        let gen = SubToAddGen;
        gen.candidates(store, &costs, model)
            .iter()
            .map(|c| gen.build(store, &costs, model, c).unwrap().unwrap().refs)
            .collect()
    }

    #[test]
    fn test_interior_minus_moves_into_the_number() {
        let mut store = Store::new();
        let model = raw_sub_state(&mut store);
        let results = apply_all(&mut store, &model);
        assert_eq!(results.len(), 1);
        let refs = &results[0];
        assert_eq!(store.op_kind(refs[1]), Some(OpKind::Add));
        assert_eq!(store.as_number(refs[2]), Some(-3));
    }

    #[test]
    fn test_second_pass_has_nothing_to_rewrite() {
        let mut store = Store::new();
        let costs = CostModel::default();
        let model = raw_sub_state(&mut store);
        let first = apply_all(&mut store, &model);
        let next = Rc::new(Model::root(first[0].clone(), 0));
        assert!(SubToAddGen.candidates(&store, &costs, &next).is_empty());
    }

    #[test]
    fn test_minus_before_variable_is_left_alone() {
        let mut store = Store::new();
        let costs = CostModel::default();
        let five = store.num(5);
        let sub = store.op(OpKind::Sub);
        let x = store.var("x");
        let model = Rc::new(Model::root(vec![five, sub, x], 0));
        assert!(SubToAddGen.candidates(&store, &costs, &model).is_empty());
    }
}
