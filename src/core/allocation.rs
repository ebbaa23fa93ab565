use serde::Serialize;

use crate::{core::decision::Decision, quantity::power::Kilowatts};

/// Split of the requested power between the two boilers.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[must_use]
pub struct Allocation {
    pub electric: Kilowatts,
    pub gas: Kilowatts,
}

impl Allocation {
    /// Assign the full demand to the selected boiler.
    ///
    /// Unknown intervals allocate nothing to either boiler, so the allocated
    /// total may fall short of the demand when prices are missing.
    pub fn new(decision: Decision, demand: Kilowatts) -> Self {
        match decision {
            Decision::ElectricBoiler => Self { electric: demand, gas: Kilowatts::ZERO },
            Decision::GasBoiler => Self { electric: Kilowatts::ZERO, gas: demand },
            Decision::Unknown => Self::default(),
        }
    }
}
