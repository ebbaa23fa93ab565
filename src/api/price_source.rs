use enumset::EnumSet;
use rust_decimal::Decimal;

use crate::{
    core::{market::Column, period::Period, timestamp::Timestamp},
    prelude::*,
    quantity::{rate::MegawattHourRate, time::Hours},
};

/// Supplier of historical market prices.
pub trait PriceSource {
    fn fetch_day_ahead(&self, country: &str, period: Period) -> Result<Payload<DayAheadRecord>>;

    fn fetch_imbalance(&self, country: &str, period: Period) -> Result<Payload<ImbalanceRecord>>;
}

/// Raw upstream rows along with the columns the upstream actually provided.
#[derive(Clone, Debug)]
#[must_use]
pub struct Payload<R> {
    pub columns: EnumSet<Column>,
    pub records: Vec<R>,
}

impl<R> Payload<R> {
    pub fn retain_within(mut self, period: Period, timestamp: impl Fn(&R) -> Timestamp) -> Self {
        self.records.retain(|record| period.contains(timestamp(record)));
        self
    }
}

#[derive(Copy, Clone, Debug)]
pub struct DayAheadRecord {
    pub timestamp: Timestamp,
    pub price: Option<MegawattHourRate>,

    /// Native cadence when the upstream states it.
    pub duration: Option<Hours>,
}

#[derive(Copy, Clone, Debug)]
pub struct ImbalanceRecord {
    pub timestamp: Timestamp,

    /// Price for a long (surplus) position.
    pub long: Option<MegawattHourRate>,

    /// Price for a short (shortage) position.
    pub short: Option<MegawattHourRate>,
}

impl ImbalanceRecord {
    /// Mean of the available long and short prices.
    #[must_use]
    pub fn average(&self) -> Option<MegawattHourRate> {
        match (self.long, self.short) {
            (Some(long), Some(short)) => Some(MegawattHourRate((long.0 + short.0) / Decimal::TWO)),
            (Some(price), None) | (None, Some(price)) => Some(price),
            (None, None) => None,
        }
    }
}
