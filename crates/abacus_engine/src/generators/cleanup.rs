//! Resolution of a leading unary sign.

use abacus_ast::{InternError, OpKind, Store};

use crate::cost::CostModel;
use crate::generator::{CandKind, Candidate, Rewrite, RewriteGen};
use crate::model::{Model, Transform};

/// Strips a leading `+`; folds a leading `- n` into a negative number.
pub struct CleanupGen;

impl RewriteGen for CleanupGen {
    fn name(&self) -> &'static str {
        "cleanup"
    }

    fn candidates(&self, store: &Store, _costs: &CostModel, model: &Model) -> Vec<Candidate> {
        let refs = &model.refs;
        if refs.len() < 2 {
            return Vec::new();
        }
        let applicable = match store.op_kind(refs[0]) {
            Some(OpKind::Add) => true,
            Some(OpKind::Sub) => store.as_number(refs[1]).is_some(),
            _ => false,
        };
        if applicable {
            vec![Candidate {
                local_cost: 1,
                kind: CandKind::Lead,
            }]
        } else {
            Vec::new()
        }
    }

    fn build(
        &self,
        store: &mut Store,
        _costs: &CostModel,
        model: &Model,
        cand: &Candidate,
    ) -> Result<Option<Rewrite>, InternError> {
        if cand.kind != CandKind::Lead {
            return Ok(None);
        }
        let refs = &model.refs;
        if refs.len() < 2 {
            return Ok(None);
        }
        match store.op_kind(refs[0]) {
            Some(OpKind::Add) => Ok(Some(Rewrite {
                transform: Transform::Cleanup,
                refs: refs[1..].to_vec(),
                result: None,
            })),
            Some(OpKind::Sub) => {
                let Some(n) = store.as_number(refs[1]) else {
                    return Ok(None);
                };
                let Some(negated) = n.checked_neg() else {
                    return Ok(None);
                };
                let head = store.num(negated);
                let mut out = Vec::with_capacity(refs.len() - 1);
                out.push(head);
                out.extend_from_slice(&refs[2..]);
                Ok(Some(Rewrite {
                    transform: Transform::Cleanup,
                    refs: out,
                    result: Some(head),
                }))
            }
            _ => Ok(None),
        }
    }
}
