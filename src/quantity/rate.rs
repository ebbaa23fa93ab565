use std::fmt::{Debug, Display, Formatter};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::quantity::Quantity;

/// Euro per kilowatt-hour.
pub type KilowattHourRate = Quantity<-1, -1, 1>;

impl Display for KilowattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4} €/kWh", self.0)
    }
}

impl Debug for KilowattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}€/kWh", self.0)
    }
}

/// Euro per megawatt-hour, the unit the wholesale markets publish in.
#[derive(
    Copy,
    Clone,
    Default,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::Sum,
)]
#[serde(transparent)]
#[must_use]
pub struct MegawattHourRate(pub Decimal);

impl MegawattHourRate {
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl Display for MegawattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} €/MWh", self.0)
    }
}

impl Debug for MegawattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}€/MWh", self.0)
    }
}

impl From<KilowattHourRate> for MegawattHourRate {
    fn from(rate: KilowattHourRate) -> Self {
        Self(rate.0 * Decimal::ONE_THOUSAND)
    }
}

impl From<MegawattHourRate> for KilowattHourRate {
    fn from(rate: MegawattHourRate) -> Self {
        Quantity(rate.0 / Decimal::ONE_THOUSAND)
    }
}
