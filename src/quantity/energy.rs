use std::{
    fmt::{Debug, Display, Formatter},
    ops::Mul,
};

use crate::quantity::{Quantity, cost::Cost, rate::KilowattHourRate};

pub type KilowattHours = Quantity<1, 1, 0>;

impl Display for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} kWh", self.0)
    }
}

impl Debug for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}kWh", self.0)
    }
}

impl Mul<KilowattHourRate> for KilowattHours {
    type Output = Cost;

    fn mul(self, rhs: KilowattHourRate) -> Self::Output {
        Quantity(self.0 * rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::quantity::{power::Kilowatts, rate::MegawattHourRate, time::Hours};

    #[test]
    fn test_cost_of_megawatt_hour_price() {
        // 0.1 MW for one hour at 20 €/MWh:
        let energy = Kilowatts::from(dec!(100)) * Hours::ONE;
        let cost = energy * KilowattHourRate::from(MegawattHourRate::from(dec!(20)));
        assert_eq!(cost, Cost::from(dec!(2)));
    }
}
