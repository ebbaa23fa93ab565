use std::fmt::{Display, Formatter};

use comfy_table::Color;
use serde::Serialize;

use crate::quantity::rate::{KilowattHourRate, MegawattHourRate};

/// Cheaper boiler for an interval.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    ElectricBoiler,
    GasBoiler,

    /// No market price was available.
    Unknown,
}

impl Decision {
    /// Pick the boiler for the market price and the gas price.
    ///
    /// The electric boiler wins only when strictly cheaper, equal prices go to gas.
    pub fn select(price: Option<MegawattHourRate>, gas_rate: KilowattHourRate) -> Self {
        match price {
            None => Self::Unknown,
            Some(price) if price < MegawattHourRate::from(gas_rate) => Self::ElectricBoiler,
            Some(_) => Self::GasBoiler,
        }
    }

    pub const fn color(self) -> Color {
        match self {
            Self::ElectricBoiler => Color::Blue,
            Self::GasBoiler => Color::Red,
            Self::Unknown => Color::DarkGrey,
        }
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ElectricBoiler => write!(f, "E-boiler"),
            Self::GasBoiler => write!(f, "Gas-boiler"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}
