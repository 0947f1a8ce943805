//! Classification of top-level refs into term shapes.
//!
//! The goal recognizer, the heuristic, and the additive generators all
//! need the same view of a term: is it a plain number, a number still
//! wrapped in an unevaluated composite, a monomial `c * v^p` in some
//! spelling, or something opaque?

use abacus_ast::{OpKind, Ref, RefId, Store};

/// Shape of one top-level term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermKind {
    Number(i64),
    /// A composite with no variables inside — a number that has not been
    /// materialized yet (phase B will lift it).
    NumericComposite,
    /// `c * v^p` in any of its spellings: a bare variable (`c = 1, p = 1`),
    /// a power composite `v^p`, or a scaled composite `c * v` / `c * v^p`
    /// (the parse-time negation `-1 * v` included).
    Monomial { coeff: i64, var: String, power: i64 },
    /// Any other composite, keyed by its cache name.
    Opaque(u32),
}

/// Classify a single ref. Operators have no term shape.
pub fn classify(store: &Store, id: RefId) -> Option<TermKind> {
    match store.get(id) {
        Ref::Number(n) => Some(TermKind::Number(*n)),
        Ref::Variable(name) => Some(TermKind::Monomial {
            coeff: 1,
            var: name.clone(),
            power: 1,
        }),
        Ref::Op(_) => None,
        Ref::Composite { name, .. } => {
            if let Some((var, power)) = as_power(store, id) {
                return Some(TermKind::Monomial {
                    coeff: 1,
                    var,
                    power,
                });
            }
            if let Some(kind) = as_scaled(store, id) {
                return Some(kind);
            }
            if store.variables(id).is_empty() {
                return Some(TermKind::NumericComposite);
            }
            Some(TermKind::Opaque(*name))
        }
    }
}

/// A bare variable (`power = 1`) or a power composite `v^n`.
pub(crate) fn variable_power(store: &Store, id: RefId) -> Option<(String, i64)> {
    if let Ref::Variable(name) = store.get(id) {
        return Some((name.clone(), 1));
    }
    as_power(store, id)
}

/// `[v, ^, n]` with a variable base and an integer exponent.
fn as_power(store: &Store, id: RefId) -> Option<(String, i64)> {
    let children = store.children(id)?;
    let &[base, op, exp] = children else {
        return None;
    };
    if store.op_kind(op) != Some(OpKind::Pow) {
        return None;
    }
    let Ref::Variable(name) = store.get(base) else {
        return None;
    };
    let power = store.as_number(exp)?;
    Some((name.clone(), power))
}

/// `[c, *, X]` or `[X, *, c]` where `X` is a variable or a power.
fn as_scaled(store: &Store, id: RefId) -> Option<TermKind> {
    let children = store.children(id)?;
    let &[a, op, b] = children else {
        return None;
    };
    if store.op_kind(op) != Some(OpKind::Mul) {
        return None;
    }
    let (coeff, varish) = match (store.as_number(a), store.as_number(b)) {
        (Some(c), None) => (c, b),
        (None, Some(c)) => (c, a),
        _ => return None,
    };
    let (var, power) = match store.get(varish) {
        Ref::Variable(name) => (name.clone(), 1),
        _ => as_power(store, varish)?,
    };
    Some(TermKind::Monomial { coeff, var, power })
}

/// Indices of terms eligible for additive pairing: non-operator refs
/// whose neighbors on both sides are `+` ops or sequence boundaries.
/// Terms inside `* / ^` runs and behind an unresolved sign are excluded.
pub fn additive_terms(store: &Store, refs: &[RefId]) -> Vec<usize> {
    let mut out = Vec::new();
    for (i, &id) in refs.iter().enumerate() {
        if store.is_op(id) {
            continue;
        }
        let left_ok = i == 0 || store.op_kind(refs[i - 1]) == Some(OpKind::Add);
        let right_ok = i + 1 == refs.len() || store.op_kind(refs[i + 1]) == Some(OpKind::Add);
        if left_ok && right_ok {
            out.push(i);
        }
    }
    out
}
