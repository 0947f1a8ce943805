//! Proptest strategies for random linear expressions.
//!
//! Kept deliberately inside the goal-reachable fragment: sums of integer
//! literals, variables, and scaled variables with explicit signs. The
//! engine should solve every expression this module can produce.

use proptest::prelude::*;

#[derive(Debug, Clone)]
pub enum TermSpec {
    Int(i64),
    Var(char),
    Scaled(i64, char),
}

impl TermSpec {
    fn render(&self) -> String {
        match self {
            TermSpec::Int(n) => n.to_string(),
            TermSpec::Var(v) => v.to_string(),
            TermSpec::Scaled(c, v) => format!("{c} * {v}"),
        }
    }
}

fn arb_var() -> impl Strategy<Value = char> {
    prop_oneof![Just('x'), Just('y'), Just('z')]
}

pub fn arb_term() -> impl Strategy<Value = TermSpec> {
    prop_oneof![
        (0i64..=30).prop_map(TermSpec::Int),
        arb_var().prop_map(TermSpec::Var),
        (2i64..=9, arb_var()).prop_map(|(c, v)| TermSpec::Scaled(c, v)),
    ]
}

/// A signed sum of one to four simple terms, e.g. `-4 + 2 * x - y`.
pub fn arb_linear_expr() -> impl Strategy<Value = String> {
    (
        any::<bool>(),
        proptest::collection::vec((any::<bool>(), arb_term()), 1..=4),
    )
        .prop_map(|(lead_minus, terms)| {
            let mut out = String::new();
            for (i, (minus, term)) in terms.iter().enumerate() {
                if i == 0 {
                    if lead_minus {
                        out.push_str("- ");
                    }
                } else if *minus {
                    out.push_str(" - ");
                } else {
                    out.push_str(" + ");
                }
                out.push_str(&term.render());
            }
            out
        })
}
