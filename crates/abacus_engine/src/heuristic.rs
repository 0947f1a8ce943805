//! Lower bound on the remaining rewrite cost of a state.
//!
//! Terms are grouped by what they could ever combine with; each surplus
//! group member is priced at the cheapest rewrite that could absorb it,
//! and each pending `* / ^` operator at the cheapest multiplication that
//! could resolve it. Computed once per model, at construction.

use abacus_ast::{RefId, Store};
use rustc_hash::FxHashMap;

use crate::cost::{Cost, CostModel};
use crate::goal::is_goal;
use crate::term::{additive_terms, classify, TermKind};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    Numbers,
    Var(String, i64),
    Comp(u32),
}

pub fn heuristic(store: &Store, costs: &CostModel, refs: &[RefId]) -> Cost {
    if is_goal(store, refs) {
        return 0;
    }
    let span = costs.digit_span();

    let mut groups: FxHashMap<GroupKey, Vec<TermKind>> = FxHashMap::default();
    for i in additive_terms(store, refs) {
        let Some(kind) = classify(store, refs[i]) else {
            continue;
        };
        let key = match &kind {
            TermKind::Number(_) | TermKind::NumericComposite => GroupKey::Numbers,
            TermKind::Monomial { var, power, .. } => GroupKey::Var(var.clone(), *power),
            TermKind::Opaque(name) => GroupKey::Comp(*name),
        };
        groups.entry(key).or_default().push(kind);
    }

    let mut estimate: Cost = 0;
    for (key, members) in &groups {
        let n = members.len() as Cost;
        if n < 2 {
            continue;
        }
        estimate += match key {
            GroupKey::Numbers => (n - 1) * costs.add_per_digit * span,
            GroupKey::Var(..) => {
                let net = members.iter().try_fold(0i64, |acc, kind| match kind {
                    TermKind::Monomial { coeff, .. } => acc.checked_add(*coeff),
                    _ => None,
                });
                // A group whose coefficients sum to zero will be closed by
                // the rewarded cancellation, its cheapest available rewrite.
                if net == Some(0) {
                    costs.var_cancel_reward + (n - 2) * costs.var_combine
                } else {
                    (n - 1) * costs.var_combine
                }
            }
            GroupKey::Comp(_) => (n - 1) * costs.expr_combine,
        };
    }

    let group_count = groups.len() as Cost;
    if group_count > 1 {
        estimate += (group_count - 1) * costs.var_base;
    }

    let pending_ops = refs
        .iter()
        .filter(|&&id| matches!(store.op_kind(id), Some(op) if op.is_multiplicative()))
        .count() as Cost;
    estimate += pending_ops * costs.mul_single_digit * span;

    estimate.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(text: &str) -> Cost {
        let mut store = Store::new();
        let refs = abacus_parser::parse(&mut store, text).unwrap();
        heuristic(&store, &CostModel::default(), &refs)
    }

    #[test]
    fn test_goal_states_estimate_zero() {
        assert_eq!(h("16"), 0);
        assert_eq!(h("5 + x"), 0);
        assert_eq!(h("x^5"), 0);
    }

    #[test]
    fn test_number_group_charges_per_surplus_member() {
        let costs = CostModel::default();
        let base = costs.add_per_digit * costs.digit_span();
        assert_eq!(h("2 + 3"), base);
        assert_eq!(h("2 + 3 + 4"), 2 * base);
    }

    #[test]
    fn test_variable_group_charges_combine() {
        let costs = CostModel::default();
        assert_eq!(h("x + x"), costs.var_combine);
    }

    #[test]
    fn test_cancelling_group_uses_the_reward() {
        // x - x nets to zero; the estimate clamps at zero rather than
        // going negative.
        assert_eq!(h("x - x"), 0);
    }

    #[test]
    fn test_pending_operators_are_priced() {
        let costs = CostModel::default();
        let op_unit = costs.mul_single_digit * costs.digit_span();
        assert_eq!(h("3 * 4"), op_unit);
        assert_eq!(h("x^2 * x^3"), op_unit);
    }

    #[test]
    fn test_product_members_do_not_join_groups() {
        let costs = CostModel::default();
        let op_unit = costs.mul_single_digit * costs.digit_span();
        // 3 and 4 sit inside the product: only the lone `4` is a number
        // term, so no group charge applies.
        assert_eq!(h("4 + 3 * 4"), op_unit);
    }

    #[test]
    fn test_estimate_never_exceeds_scenario_path_cost() {
        // 2 + 3 + 4: two merges at one digit each plus two materialize
        // steps = 4; the estimate must stay at or below that.
        assert!(h("2 + 3 + 4") <= 4);
    }
}
