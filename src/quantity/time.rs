use std::fmt::{Debug, Display, Formatter};

use chrono::TimeDelta;
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::quantity::Quantity;

pub type Hours = Quantity<0, 1, 0>;

impl Hours {
    pub const ONE: Self = Self(Decimal::ONE);

    /// Quarter of an hour, the default cadence of the European power markets.
    pub const QUARTER: Self = Self(Decimal::from_parts(25, 0, 0, false, 2));

    /// Convert the time delta into hours, keeping the sub-second precision.
    pub fn from_time_delta(time_delta: TimeDelta) -> Self {
        let milliseconds = Decimal::from(time_delta.num_milliseconds());
        Self(milliseconds / Decimal::from(3_600_000))
    }

    /// Convert back to a time delta, rounded to milliseconds.
    #[must_use]
    pub fn to_time_delta(self) -> TimeDelta {
        (self.0 * Decimal::from(3_600_000))
            .round()
            .to_i64()
            .map_or_else(TimeDelta::zero, TimeDelta::milliseconds)
    }
}

impl Display for Hours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} h", self.0.normalize())
    }
}

impl Debug for Hours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h", self.0.normalize())
    }
}
