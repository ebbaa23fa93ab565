//! Per-interval costs and per-market totals.

use serde::Serialize;

use crate::{
    core::{
        allocation::Allocation,
        decision::Decision,
        demand::Demand,
        interval::PriceInterval,
        market::Market,
        timestamp::Timestamp,
    },
    error::AnalysisError,
    prelude::*,
    quantity::{
        cost::Cost,
        percent::Percent,
        power::Kilowatts,
        rate::KilowattHourRate,
        time::Hours,
    },
};

#[derive(Copy, Clone, Debug, Serialize)]
#[must_use]
pub struct IntervalResult {
    #[serde(flatten)]
    pub interval: PriceInterval,

    pub decision: Decision,

    #[serde(rename = "demand_kw")]
    pub demand: Kilowatts,

    #[serde(rename = "electric_power_kw")]
    pub electric_power: Kilowatts,

    #[serde(rename = "gas_power_kw")]
    pub gas_power: Kilowatts,

    /// Hours the demand is billed for.
    #[serde(rename = "billed_hours")]
    pub billed_duration: Hours,

    #[serde(rename = "electric_cost_eur")]
    pub electric_cost: Cost,

    #[serde(rename = "gas_cost_eur")]
    pub gas_cost: Cost,

    /// Cost had only the gas boiler been used.
    #[serde(rename = "counterfactual_gas_only_cost_eur")]
    pub counterfactual_cost: Cost,

    /// Effective rates of the chosen boiler, as plotted on the price chart.
    pub price_view: PriceView,
}

/// Effective price per boiler, zero for the boiler that is not running.
#[derive(Copy, Clone, Debug, Default, Serialize)]
pub struct PriceView {
    #[serde(rename = "electric_eur_per_kwh")]
    pub electric: KilowattHourRate,

    #[serde(rename = "gas_eur_per_kwh")]
    pub gas: KilowattHourRate,
}

impl IntervalResult {
    pub fn evaluate(
        market: Market,
        interval: PriceInterval,
        demand: Kilowatts,
        gas_rate: KilowattHourRate,
    ) -> Self {
        let decision = Decision::select(interval.price, gas_rate);
        let allocation = Allocation::new(decision, demand);
        let billed_duration = market.billed_duration(&interval);

        let electric_rate = match decision {
            Decision::ElectricBoiler => interval.price.map_or(KilowattHourRate::ZERO, Into::into),
            Decision::GasBoiler | Decision::Unknown => KilowattHourRate::ZERO,
        };
        let gas_power_rate = match decision {
            Decision::GasBoiler => gas_rate,
            Decision::ElectricBoiler | Decision::Unknown => KilowattHourRate::ZERO,
        };

        Self {
            interval,
            decision,
            demand,
            electric_power: allocation.electric,
            gas_power: allocation.gas,
            billed_duration,
            electric_cost: allocation.electric * billed_duration * electric_rate,
            gas_cost: allocation.gas * billed_duration * gas_rate,
            counterfactual_cost: demand * billed_duration * gas_rate,
            price_view: PriceView {
                electric: electric_rate * billed_duration.0,
                gas: gas_power_rate * billed_duration.0,
            },
        }
    }

    #[must_use]
    pub const fn timestamp(&self) -> Timestamp {
        self.interval.timestamp
    }
}

/// Totals of one market over the run.
#[derive(Copy, Clone, Debug, Default, Serialize)]
#[must_use]
pub struct MarketSummary {
    #[serde(rename = "total_savings_eur")]
    pub total_savings: Cost,

    pub percentage_savings: Percent,

    #[serde(rename = "total_electric_cost_eur")]
    pub total_electric_cost: Cost,

    #[serde(rename = "total_gas_cost_eur")]
    pub total_gas_cost: Cost,

    #[serde(rename = "total_counterfactual_cost_eur")]
    pub total_counterfactual_cost: Cost,

    /// Actual cost of running both boilers.
    #[serde(rename = "total_mixed_cost_eur")]
    pub total_mixed_cost: Cost,

    #[serde(rename = "total_electric_power_kw")]
    pub total_electric_power: Kilowatts,

    #[serde(rename = "total_gas_power_kw")]
    pub total_gas_power: Kilowatts,

    pub n_electric: usize,
    pub n_gas: usize,
    pub n_unknown: usize,
}

impl MarketSummary {
    /// Sum up the interval results.
    ///
    /// Unknown intervals add to the counterfactual total but to neither actual
    /// cost, so they show up as savings.
    pub fn from_results(results: &[IntervalResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.total_electric_cost += result.electric_cost;
            summary.total_gas_cost += result.gas_cost;
            summary.total_counterfactual_cost += result.counterfactual_cost;
            summary.total_electric_power += result.electric_power;
            summary.total_gas_power += result.gas_power;
            match result.decision {
                Decision::ElectricBoiler => summary.n_electric += 1,
                Decision::GasBoiler => summary.n_gas += 1,
                Decision::Unknown => summary.n_unknown += 1,
            }
        }
        summary.total_mixed_cost = summary.total_electric_cost + summary.total_gas_cost;
        summary.total_savings = summary.total_counterfactual_cost - summary.total_mixed_cost;
        summary.percentage_savings =
            Percent::of(summary.total_savings.0, summary.total_counterfactual_cost.0);
        summary
    }
}

/// Enriched interval table and totals of one market.
#[derive(Clone, Debug, Serialize)]
#[must_use]
pub struct MarketReport {
    pub market: Market,
    pub summary: MarketSummary,
    pub intervals: Vec<IntervalResult>,
}

impl MarketReport {
    #[instrument(skip_all, fields(market = %market, n_intervals = intervals.len()))]
    pub fn evaluate(
        market: Market,
        intervals: Vec<PriceInterval>,
        demand: &Demand,
        gas_rate: KilowattHourRate,
    ) -> Result<Self, AnalysisError> {
        let timeline: Vec<Timestamp> =
            intervals.iter().map(|interval| interval.timestamp).collect();
        let demand = demand.resolve(&timeline)?;
        let intervals: Vec<IntervalResult> = intervals
            .into_iter()
            .zip(demand)
            .map(|(interval, demand)| IntervalResult::evaluate(market, interval, demand, gas_rate))
            .collect();
        let summary = MarketSummary::from_results(&intervals);
        info!(
            savings = %summary.total_savings,
            percentage = %summary.percentage_savings,
            n_unknown = summary.n_unknown,
            "evaluated",
        );
        Ok(Self { market, summary, intervals })
    }
}
