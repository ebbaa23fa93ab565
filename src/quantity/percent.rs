use std::fmt::{Debug, Display, Formatter};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Percentage, stored as `100 × ratio`.
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
#[must_use]
pub struct Percent(pub Decimal);

impl Percent {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Calculate `numerator / denominator × 100`, returning zero for a zero denominator.
    pub fn of(numerator: Decimal, denominator: Decimal) -> Self {
        if denominator.is_zero() {
            Self::ZERO
        } else {
            Self(numerator / denominator * Decimal::ONE_HUNDRED)
        }
    }
}

impl Display for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

impl Debug for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
