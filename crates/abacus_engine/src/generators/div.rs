//! Resolution of adjacent `(L, /, R)` triples.

use abacus_ast::{Compute, InternError, OpKind, RefId, Store};
use num_integer::Integer;
use num_traits::Zero;

use crate::cost::CostModel;
use crate::generator::{CandKind, Candidate, Rewrite, RewriteGen};
use crate::generators::splice_triple;
use crate::model::{Model, Transform};
use crate::term::variable_power;

/// Folds one division: exact integer quotients (lazily) and same-base
/// power quotients by exponent difference.
pub struct DivGen;

enum Variant {
    Numbers,
    Powers,
}

impl RewriteGen for DivGen {
    fn name(&self) -> &'static str {
        "div"
    }

    fn candidates(&self, store: &Store, costs: &CostModel, model: &Model) -> Vec<Candidate> {
        let refs = &model.refs;
        let mut out = Vec::new();
        for at in 1..refs.len().saturating_sub(1) {
            if triple_at(store, refs, at).is_some() {
                out.push(Candidate {
                    local_cost: costs.div,
                    kind: CandKind::Triple { at },
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
    ) -> Result<Option<Rewrite>, InternError> {
        let CandKind::Triple { at } = cand.kind else {
            return Ok(None);
        };
        let refs = &model.refs;
        let Some(variant) = triple_at(store, refs, at) else {
            return Ok(None);
        };
        let (l, r) = (refs[at - 1], refs[at + 1]);
        let (transform, merged) = match variant {
            Variant::Numbers => {
                let div = store.op(OpKind::Div);
                (
                    Transform::DivideNumbers,
                    store.intern(vec![l, div, r], Some(Compute::Div))?,
                )
            }
            Variant::Powers => {
                let (Some((var, p)), Some((_, q))) =
                    (variable_power(store, l), variable_power(store, r))
                else {
                    return Ok(None);
                };
                let Some(d) = p.checked_sub(q) else {
                    return Ok(None);
                };
                let merged = match d {
                    0 => store.num(1),
                    1 => store.var(&var),
                    d if d > 1 => power_ref(store, &var, d)?,
                    d => {
                        // Negative difference: 1 / v^(-d).
                        let denom = if d == -1 {
                            store.var(&var)
                        } else {
                            power_ref(store, &var, -d)?
                        };
                        let one = store.num(1);
                        let div = store.op(OpKind::Div);
                        store.intern(vec![one, div, denom], Some(Compute::Div))?
                    }
                };
                (Transform::DividePowers, merged)
            }
        };
        Ok(Some(Rewrite {
            transform,
            refs: splice_triple(refs, at, merged),
            result: Some(merged),
        }))
    }
}

fn power_ref(store: &mut Store, var: &str, power: i64) -> Result<RefId, InternError> {
    let v = store.var(var);
    let pow = store.op(OpKind::Pow);
    let p = store.num(power);
    store.intern(vec![v, pow, p], None)
}

fn triple_at(store: &Store, refs: &[RefId], at: usize) -> Option<Variant> {
    if at == 0 || at + 1 >= refs.len() || store.op_kind(refs[at]) != Some(OpKind::Div) {
        return None;
    }
    if at >= 2 && matches!(store.op_kind(refs[at - 2]), Some(OpKind::Div | OpKind::Sub)) {
        return None;
    }
    let (l, r) = (refs[at - 1], refs[at + 1]);
    if store.is_op(l) || store.is_op(r) {
        return None;
    }
    match (store.as_number(l), store.as_number(r)) {
        (Some(a), Some(b)) => {
            (!b.is_zero() && a.is_multiple_of(&b)).then_some(Variant::Numbers)
        }
        (None, None) => {
            let (va, pa) = variable_power(store, l)?;
            let (vb, pb) = variable_power(store, r)?;
            (va == vb && pa.checked_sub(pb).is_some()).then_some(Variant::Powers)
        }
        _ => None,
    }
}
