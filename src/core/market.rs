use std::fmt::{Display, Formatter};

use comfy_table::Color;
use serde::{Deserialize, Serialize};

use crate::{core::interval::PriceInterval, quantity::time::Hours};

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Market {
    /// Prices fixed one day in advance per delivery period.
    DayAhead,

    /// Balancing-market prices, settled afterwards at sub-hourly cadence.
    Imbalance,
}

impl Display for Market {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DayAhead => write!(f, "Day-Ahead"),
            Self::Imbalance => write!(f, "Imbalance"),
        }
    }
}

impl Market {
    /// Duration the interval demand is billed for.
    ///
    /// Day-ahead costs are quoted per hour of demand regardless of the cadence,
    /// while imbalance costs integrate the price over the actual interval length.
    pub const fn billed_duration(self, interval: &PriceInterval) -> Hours {
        match self {
            Self::DayAhead => Hours::ONE,
            Self::Imbalance => interval.duration,
        }
    }

    pub const fn color(self) -> Color {
        match self {
            Self::DayAhead => Color::Cyan,
            Self::Imbalance => Color::Magenta,
        }
    }
}

/// Upstream payload columns the normalizer relies on.
#[derive(Debug, enumset::EnumSetType)]
pub enum Column {
    Time,
    Price,
    Long,
    Short,
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Time => write!(f, "Time"),
            Self::Price => write!(f, "Price"),
            Self::Long => write!(f, "Long"),
            Self::Short => write!(f, "Short"),
        }
    }
}
