//! Resolution of adjacent `(L, *, R)` triples.

use abacus_ast::{Compute, InternError, OpKind, RefId, Store};

use crate::cost::{Cost, CostModel};
use crate::generator::{CandKind, Candidate, Rewrite, RewriteGen};
use crate::generators::{monomial_ref, splice_triple};
use crate::model::{Model, Transform};
use crate::term::variable_power;

/// Folds one multiplication into a composite: number times number
/// (lazily), coefficient times variable, or same-variable powers.
pub struct MulGen;

enum Variant {
    Numbers,
    Scale,
    Powers,
}

impl RewriteGen for MulGen {
    fn name(&self) -> &'static str {
        "mul"
    }

    fn candidates(&self, store: &Store, costs: &CostModel, model: &Model) -> Vec<Candidate> {
        let refs = &model.refs;
        let mut out = Vec::new();
        for at in 1..refs.len().saturating_sub(1) {
            if let Some((_, cost)) = triple_at(store, costs, refs, at) {
                out.push(Candidate {
                    local_cost: cost,
                    kind: CandKind::Triple { at },
                });
            }
        }
        out.sort_by_key(|c| c.local_cost);
        out
    }

    fn build(
        &self,
        store: &mut Store,
        costs: &CostModel,
        model: &Model,
        cand: &Candidate,
    ) -> Result<Option<Rewrite>, InternError> {
        let CandKind::Triple { at } = cand.kind else {
            return Ok(None);
        };
        let refs = &model.refs;
        let Some((variant, _)) = triple_at(store, costs, refs, at) else {
            return Ok(None);
        };
        let (l, r) = (refs[at - 1], refs[at + 1]);
        let (transform, merged) = match variant {
            Variant::Numbers => {
                let mul = store.op(OpKind::Mul);
                (
                    Transform::MultiplyNumbers,
                    store.intern(vec![l, mul, r], Some(Compute::Mul))?,
                )
            }
            Variant::Scale => {
                // Number first, whichever side it came from.
                let (c, varish) = if store.as_number(l).is_some() { (l, r) } else { (r, l) };
                let mul = store.op(OpKind::Mul);
                (
                    Transform::ScaleVariable,
                    store.intern(vec![c, mul, varish], Some(Compute::Mul))?,
                )
            }
            Variant::Powers => {
                let (Some((var, p)), Some((_, q))) =
                    (variable_power(store, l), variable_power(store, r))
                else {
                    return Ok(None);
                };
                let Some(power) = p.checked_add(q) else {
                    return Ok(None);
                };
                (Transform::MultiplyPowers, monomial_ref(store, 1, &var, power)?)
            }
        };
        Ok(Some(Rewrite {
            transform,
            refs: splice_triple(refs, at, merged),
            result: Some(merged),
        }))
    }
}

fn triple_at(
    store: &Store,
    costs: &CostModel,
    refs: &[RefId],
    at: usize,
) -> Option<(Variant, Cost)> {
    if at == 0 || at + 1 >= refs.len() || store.op_kind(refs[at]) != Some(OpKind::Mul) {
        return None;
    }
    // The left operand is not ours while a `/` still binds it (left
    // associativity) or a leading sign is unresolved.
    if at >= 2 && matches!(store.op_kind(refs[at - 2]), Some(OpKind::Div | OpKind::Sub)) {
        return None;
    }
    let (l, r) = (refs[at - 1], refs[at + 1]);
    if store.is_op(l) || store.is_op(r) {
        return None;
    }
    match (store.as_number(l), store.as_number(r)) {
        (Some(a), Some(b)) => Some((Variant::Numbers, costs.mul_cost(a, b))),
        (Some(_), None) | (None, Some(_)) => {
            let varish = if store.as_number(l).is_some() { r } else { l };
            variable_power(store, varish).map(|_| (Variant::Scale, costs.coeff_var_mul))
        }
        (None, None) => {
            let (va, pa) = variable_power(store, l)?;
            let (vb, pb) = variable_power(store, r)?;
            (va == vb && pa.checked_add(pb).is_some())
                .then_some((Variant::Powers, costs.same_var_mul))
        }
    }
}
