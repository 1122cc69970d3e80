//! Loyalty point accrual.

use serde::Serialize;

/// Default spend per loyalty point, in minor units.
pub const DEFAULT_AMOUNT_PER_POINT: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoyaltyPolicy {
    pub amount_per_point: u64,
}

impl Default for LoyaltyPolicy {
    fn default() -> Self {
        Self {
            amount_per_point: DEFAULT_AMOUNT_PER_POINT,
        }
    }
}

impl LoyaltyPolicy {
    /// Whole points earned for `total_amount`. A zero rate earns nothing.
    #[must_use]
    pub fn points_for(&self, total_amount: u64) -> u64 {
        total_amount
            .checked_div(self.amount_per_point)
            .unwrap_or_default()
    }
}

/// What happened to the loyalty balance after an order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoyaltyAccrual {
    Credited { points: u64, balance: u64 },

    /// The order total did not reach a whole point.
    NotEligible,

    /// The order stands; the points were not credited.
    Failed { points: u64, reason: String },
}
