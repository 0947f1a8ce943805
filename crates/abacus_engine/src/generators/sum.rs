//! Merging of compatible additive term pairs.

use abacus_ast::{Compute, InternError, OpKind, RefId, Store};

use crate::cost::{Cost, CostModel};
use crate::generator::{CandKind, Candidate, Rewrite, RewriteGen};
use crate::generators::monomial_ref;
use crate::model::{Model, Transform};
use crate::term::{additive_terms, classify, TermKind};

/// Combines two additive terms into one.
///
/// Number pairs defer the arithmetic to a lazy composite; monomial pairs
/// fold their coefficients eagerly; structurally compatible composites
/// aggregate lazily. A merge that is known to produce zero yields an
/// eager `0` at the (negative) cancel reward.
pub struct SumGen;

impl RewriteGen for SumGen {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn candidates(&self, store: &Store, costs: &CostModel, model: &Model) -> Vec<Candidate> {
        let terms = additive_terms(store, &model.refs);
        let mut out = Vec::new();
        for (pos, &i) in terms.iter().enumerate() {
            for &j in &terms[pos + 1..] {
                if let Some(cost) = pair_cost(store, costs, model.refs[i], model.refs[j]) {
                    out.push(Candidate {
                        local_cost: cost,
                        kind: CandKind::TermPair { i, j },
                    });
                }
            }
        }
        out.sort_by_key(|c| c.local_cost);
        out
    }

    fn build(
        &self,
        store: &mut Store,
        _costs: &CostModel,
        model: &Model,
        cand: &Candidate,
    ) -> Result<Option<Rewrite>, InternError> {
        let CandKind::TermPair { i, j } = cand.kind else {
            return Ok(None);
        };
        let refs = &model.refs;
        if j >= refs.len() || i >= j {
            return Ok(None);
        }
        let (ra, rb) = (refs[i], refs[j]);
        let (Some(ka), Some(kb)) = (classify(store, ra), classify(store, rb)) else {
            return Ok(None);
        };

        let (transform, merged) = match (&ka, &kb) {
            (TermKind::Number(a), TermKind::Number(b)) => {
                let Some(sum) = a.checked_add(*b) else {
                    return Ok(None);
                };
                if sum == 0 {
                    (Transform::CancelZero, store.num(0))
                } else {
                    let add = store.op(OpKind::Add);
                    (
                        Transform::MergeNumbers,
                        store.intern(vec![ra, add, rb], Some(Compute::Add))?,
                    )
                }
            }
            (
                TermKind::Monomial {
                    coeff: ca,
                    var,
                    power,
                },
                TermKind::Monomial {
                    coeff: cb,
                    var: vb,
                    power: pb,
                },
            ) if var == vb && power == pb => {
                let Some(net) = ca.checked_add(*cb) else {
                    return Ok(None);
                };
                if net == 0 {
                    (Transform::CancelZero, store.num(0))
                } else {
                    (Transform::CombineTerms, monomial_ref(store, net, var, *power)?)
                }
            }
            _ => {
                if compatible_composites(store, ra, rb) {
                    let add = store.op(OpKind::Add);
                    (
                        Transform::AggregateExprs,
                        store.intern(vec![ra, add, rb], Some(Compute::Add))?,
                    )
                } else {
                    return Ok(None);
                }
            }
        };

        // Replace term i with the merged ref; drop term j and its `+`.
        let mut out = Vec::with_capacity(refs.len().saturating_sub(2));
        for (k, &id) in refs.iter().enumerate() {
            if k == j || k + 1 == j {
                continue;
            }
            out.push(if k == i { merged } else { id });
        }
        Ok(Some(Rewrite {
            transform,
            refs: out,
            result: Some(merged),
        }))
    }
}

fn pair_cost(store: &Store, costs: &CostModel, ra: RefId, rb: RefId) -> Option<Cost> {
    let ka = classify(store, ra)?;
    let kb = classify(store, rb)?;
    match (&ka, &kb) {
        (TermKind::Number(a), TermKind::Number(b)) => {
            let sum = a.checked_add(*b)?;
            if sum == 0 {
                return Some(costs.var_cancel_reward);
            }
            let (aa, bb) = (a.checked_abs()?, b.checked_abs()?);
            // The effective operation follows the embedded signs.
            Some(if (*a < 0) == (*b < 0) {
                costs.add_cost(aa, bb)
            } else {
                costs.sub_cost(aa, bb)
            })
        }
        (
            TermKind::Monomial {
                coeff: ca,
                var: va,
                power: pa,
            },
            TermKind::Monomial {
                coeff: cb,
                var: vb,
                power: pb,
            },
        ) if va == vb && pa == pb => {
            let net = ca.checked_add(*cb)?;
            Some(if net == 0 {
                costs.var_cancel_reward
            } else {
                costs.var_combine
            })
        }
        _ => compatible_composites(store, ra, rb).then_some(costs.expr_combine),
    }
}

/// Two composites with identical variable sets may aggregate.
fn compatible_composites(store: &Store, ra: RefId, rb: RefId) -> bool {
    store.children(ra).is_some()
        && store.children(rb).is_some()
        && store.variables(ra) == store.variables(rb)
}
