use serde::Serialize;

use crate::{
    core::timestamp::Timestamp,
    quantity::{rate::MegawattHourRate, time::Hours},
};

/// Normalized market price over one settlement interval.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[must_use]
pub struct PriceInterval {
    /// Interval start.
    pub timestamp: Timestamp,

    /// Missing when the market published no price for the interval.
    pub price: Option<MegawattHourRate>,

    /// Always positive.
    #[serde(rename = "duration_hours")]
    pub duration: Hours,
}

impl PriceInterval {
    pub const fn new(
        timestamp: Timestamp,
        price: Option<MegawattHourRate>,
        duration: Hours,
    ) -> Self {
        Self { timestamp, price, duration }
    }

    #[must_use]
    pub fn end(&self) -> Timestamp {
        self.timestamp + self.duration.to_time_delta()
    }
}
