//! Removal of opposite additive term pairs.

use abacus_ast::{InternError, OpKind, RefId, Store};

use crate::cost::CostModel;
use crate::generator::{CandKind, Candidate, Rewrite, RewriteGen};
use crate::model::{Model, Transform};
use crate::term::additive_terms;

/// Removes a term together with its negation `(-1 * term)`, wherever the
/// two sit in the sum and in either order.
pub struct CancelGen;

impl RewriteGen for CancelGen {
    fn name(&self) -> &'static str {
        "cancel"
    }

    fn candidates(&self, store: &Store, _costs: &CostModel, model: &Model) -> Vec<Candidate> {
        let terms = additive_terms(store, &model.refs);
        let mut out = Vec::new();
        for (pos, &i) in terms.iter().enumerate() {
            for &j in &terms[pos + 1..] {
                let (a, b) = (model.refs[i], model.refs[j]);
                if negation_of(store, a, b) || negation_of(store, b, a) {
                    out.push(Candidate {
                        local_cost: 1,
                        kind: CandKind::TermPair { i, j },
                    });
                }
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
        let CandKind::TermPair { i, j } = cand.kind else {
            return Ok(None);
        };
        let refs = &model.refs;
        if j >= refs.len() || i >= j {
            return Ok(None);
        }
        let (a, b) = (refs[i], refs[j]);
        if !(negation_of(store, a, b) || negation_of(store, b, a)) {
            return Ok(None);
        }
        // Each cancelled term falls together with one adjacent `+`: the
        // one before it, or for the head term the one after it. When the
        // pair is adjacent at the head, the interior `+` covers only one
        // of the two, so the operator after the pair goes as well.
        let mut dropped = vec![j - 1, j];
        if i > 0 {
            dropped.push(i - 1);
            dropped.push(i);
        } else {
            dropped.push(0);
            if j == 2 {
                if j + 1 < refs.len() {
                    dropped.push(j + 1);
                }
            } else {
                dropped.push(1);
            }
        }
        let mut out = Vec::with_capacity(refs.len().saturating_sub(4));
        for (k, &id) in refs.iter().enumerate() {
            if !dropped.contains(&k) {
                out.push(id);
            }
        }
        if out.is_empty() {
            out.push(store.num(0));
        }
        Ok(Some(Rewrite {
            transform: Transform::CancelPair,
            refs: out,
            result: None,
        }))
    }
}

/// Is `n` the composite `(-1 * t)`?
fn negation_of(store: &Store, n: RefId, t: RefId) -> bool {
    let Some(children) = store.children(n) else {
        return false;
    };
    let &[c, op, x] = children else {
        return false;
    };
    store.as_number(c) == Some(-1) && store.op_kind(op) == Some(OpKind::Mul) && x == t
}
