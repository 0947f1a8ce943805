//! Operation costs approximating the effort of doing arithmetic by hand.
//!
//! The table is deliberately coarse: single-digit work is cheap, digit
//! count drives everything else, and `var_cancel_reward` is the one
//! negative entry, biasing the search toward cancellations.

use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// Scalar rewrite cost. Signed because the cancel reward is negative.
pub type Cost = i64;

/// Read-only cost configuration for one search.
///
/// All entries are non-negative except `var_cancel_reward`.
/// `max_magnitude` is the `MAX` bound the heuristic uses to price an
/// unresolved number or multiplication (its base-10 digit span).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModel {
    pub add_zero: Cost,
    pub add_single_digit: Cost,
    pub add_per_digit: Cost,
    pub sub_identical: Cost,
    pub sub_diff_by_one: Cost,
    pub sub_per_digit: Cost,
    pub mul_by_zero: Cost,
    pub mul_by_one: Cost,
    pub mul_single_digit: Cost,
    pub mul_digit_exponent: u32,
    pub var_base: Cost,
    pub var_combine: Cost,
    pub var_cancel_reward: Cost,
    pub expr_combine: Cost,
    pub coeff_var_mul: Cost,
    pub same_var_mul: Cost,
    pub div: Cost,
    pub max_magnitude: i64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            add_zero: 1,
            add_single_digit: 1,
            add_per_digit: 1,
            sub_identical: 1,
            sub_diff_by_one: 2,
            sub_per_digit: 2,
            mul_by_zero: 1,
            mul_by_one: 1,
            mul_single_digit: 2,
            mul_digit_exponent: 2,
            var_base: 0,
            var_combine: 2,
            var_cancel_reward: -2,
            expr_combine: 2,
            coeff_var_mul: 4,
            same_var_mul: 4,
            div: 4,
            max_magnitude: 100,
        }
    }
}

impl CostModel {
    /// Effort of `a + b` done by hand.
    pub fn add_cost(&self, a: i64, b: i64) -> Cost {
        if a.is_zero() || b.is_zero() {
            return self.add_zero;
        }
        if digits(a) == 1 && digits(b) == 1 {
            return self.add_single_digit;
        }
        digits(a).max(digits(b)) * self.add_per_digit
    }

    /// Effort of `a - b` done by hand.
    pub fn sub_cost(&self, a: i64, b: i64) -> Cost {
        if a == b {
            return self.sub_identical;
        }
        if let Some(diff) = a.checked_sub(b) {
            if diff.abs() == 1 {
                return self.sub_diff_by_one;
            }
        }
        digits(a).max(digits(b)) * self.sub_per_digit
    }

    /// Effort of `a * b` done by hand.
    pub fn mul_cost(&self, a: i64, b: i64) -> Cost {
        if a.is_zero() || b.is_zero() {
            return self.mul_by_zero;
        }
        if a.abs() == 1 || b.abs() == 1 {
            return self.mul_by_one;
        }
        if digits(a) == 1 && digits(b) == 1 {
            return self.mul_single_digit;
        }
        digits(a).max(digits(b)).pow(self.mul_digit_exponent)
    }

    /// Base-10 digit span of `max_magnitude` — the heuristic's unit
    /// price for an unresolved number.
    pub fn digit_span(&self) -> Cost {
        self.max_magnitude.unsigned_abs().checked_ilog10().unwrap_or(0) as Cost
    }
}

/// Base-10 digit count of `|n|`; zero counts as one digit.
pub fn digits(n: i64) -> Cost {
    (1 + n.unsigned_abs().checked_ilog10().unwrap_or(0)) as Cost
}
