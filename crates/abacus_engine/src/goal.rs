//! Recognizer for canonical simplified forms.

use abacus_ast::{OpKind, RefId, Store};
use rustc_hash::FxHashSet;

use crate::term::{classify, TermKind};

/// Is this sequence a canonical simplified form?
///
/// Accepted: a single number, or a strictly `+`-separated sum in which at
/// most one term is a number and every other term is a monomial — a bare
/// variable, a power `v^n`, or a scaled `c * v` / `c * v^n` — with each
/// variable appearing in at most one term. Unevaluated composites and
/// pending `* / ^` operators disqualify the state.
pub fn is_goal(store: &Store, refs: &[RefId]) -> bool {
    if refs.is_empty() || refs.len() % 2 == 0 {
        return false;
    }
    let mut seen_number = false;
    let mut seen_vars: FxHashSet<String> = FxHashSet::default();
    for (i, &id) in refs.iter().enumerate() {
        if i % 2 == 1 {
            if store.op_kind(id) != Some(OpKind::Add) {
                return false;
            }
            continue;
        }
        let Some(kind) = classify(store, id) else {
            return false;
        };
        match kind {
            TermKind::Number(_) => {
                if seen_number {
                    return false;
                }
                seen_number = true;
            }
            TermKind::Monomial { power, var, .. } => {
                if power < 1 || !seen_vars.insert(var) {
                    return false;
                }
            }
            TermKind::NumericComposite | TermKind::Opaque(_) => return false,
        }
    }
    true
}
