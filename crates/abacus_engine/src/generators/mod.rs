//! The rewrite families.

mod cancel;
mod cleanup;
mod div;
mod mul;
mod paren;
mod sub_to_add;
mod sum;

pub use cancel::CancelGen;
pub use cleanup::CleanupGen;
pub use div::DivGen;
pub use mul::MulGen;
pub use paren::ParenGen;
pub use sub_to_add::SubToAddGen;
pub use sum::SumGen;

use abacus_ast::{Compute, InternError, OpKind, RefId, Store};

use crate::generator::RewriteGen;

/// The full generator set, in a fixed registration order (the order is
/// part of the engine's determinism contract).
pub fn default_generators() -> Vec<Box<dyn RewriteGen>> {
    vec![
        Box::new(SumGen),
        Box::new(MulGen),
        Box::new(DivGen),
        Box::new(CancelGen),
        Box::new(CleanupGen),
        Box::new(SubToAddGen),
        Box::new(ParenGen),
    ]
}

/// Build `coeff * var^power` in its canonical spelling: bare variable for
/// `1 * v`, a power composite for `v^n`, and a number-first scaled
/// composite otherwise.
pub(crate) fn monomial_ref(
    store: &mut Store,
    coeff: i64,
    var: &str,
    power: i64,
) -> Result<RefId, InternError> {
    let base = if power == 1 {
        store.var(var)
    } else {
        let v = store.var(var);
        let pow = store.op(OpKind::Pow);
        let p = store.num(power);
        store.intern(vec![v, pow, p], None)?
    };
    if coeff == 1 {
        return Ok(base);
    }
    let c = store.num(coeff);
    let mul = store.op(OpKind::Mul);
    store.intern(vec![c, mul, base], Some(Compute::Mul))
}

/// Replace the adjacent triple around the operator at `at` with `merged`.
pub(crate) fn splice_triple(refs: &[RefId], at: usize, merged: RefId) -> Vec<RefId> {
    let mut out = Vec::with_capacity(refs.len() - 2);
    for (k, &id) in refs.iter().enumerate() {
        if k == at || k == at + 1 {
            continue;
        }
        out.push(if k + 1 == at { merged } else { id });
    }
    out
}
