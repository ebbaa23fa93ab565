//! Cross-market profitability under negative prices.
//!
//! Profit is stored with the sign convention of the cost formula, so the
//! *lower* profit value is the more profitable one.

use std::collections::BTreeMap;

use chrono::TimeDelta;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    core::{
        aggregator::{IntervalResult, MarketReport},
        decision::Decision,
        market::Market,
        series::Bucket,
        timestamp::Timestamp,
    },
    error::AnalysisError,
    prelude::*,
    quantity::{cost::Cost, rate::MegawattHourRate},
};

/// Hourly average of a market's interval results.
#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct HourlyBucket {
    pub timestamp: Timestamp,

    /// Mean over the intervals that have a price.
    pub price: Option<MegawattHourRate>,

    pub electric_cost: Option<Cost>,
    pub gas_cost: Option<Cost>,

    /// Decision in effect at the start of the hour.
    pub decision: Option<Decision>,
}

impl HourlyBucket {
    /// Profit is only defined for negative prices.
    #[must_use]
    pub fn profit(&self) -> Option<Cost> {
        if !self.price?.is_negative() {
            return None;
        }
        Some(self.gas_cost? - self.electric_cost?.abs())
    }
}

/// Average the interval results over hourly buckets.
///
/// Numeric fields are averaged, the decision is carried forward from the
/// latest interval that started at or before the bucket start.
pub fn resample_hourly(results: &[IntervalResult]) -> Result<Vec<HourlyBucket>, AnalysisError> {
    let buckets =
        results.iter().map(|result| (result.timestamp(), result)).bucket(TimeDelta::hours(1))?;
    let mut carried_decision = None;
    let mut resampled = Vec::with_capacity(buckets.len());

    for (timestamp, results) in buckets {
        let decision = match results.first() {
            Some(first) if first.timestamp() == timestamp => Some(first.decision),
            _ => carried_decision,
        };
        if let Some(last) = results.last() {
            carried_decision = Some(last.decision);
        }
        let prices = results.iter().filter_map(|result| result.interval.price);
        resampled.push(HourlyBucket {
            timestamp,
            price: mean(prices.map(|price| price.0)).map(MegawattHourRate),
            electric_cost: mean(results.iter().map(|result| result.electric_cost.0))
                .map(Cost::from),
            gas_cost: mean(results.iter().map(|result| result.gas_cost.0)).map(Cost::from),
            decision,
        });
    }

    Ok(resampled)
}

fn mean(values: impl Iterator<Item = Decimal>) -> Option<Decimal> {
    let (sum, count) = values
        .fold((Decimal::ZERO, 0_u32), |(sum, count), value| (sum + value, count + 1));
    (count != 0).then(|| sum / Decimal::from(count))
}

#[derive(Copy, Clone, Debug, Serialize)]
#[must_use]
pub struct ProfitRow {
    pub timestamp: Timestamp,

    #[serde(rename = "profit_day_ahead_eur")]
    pub day_ahead: Option<Cost>,

    #[serde(rename = "profit_imbalance_eur")]
    pub imbalance: Option<Cost>,

    /// `None` when neither market makes a profit, or both make the same.
    #[serde(rename = "more_profitable_market")]
    pub more_profitable: Option<Market>,
}

impl ProfitRow {
    pub fn new(timestamp: Timestamp, day_ahead: Option<Cost>, imbalance: Option<Cost>) -> Self {
        let more_profitable = match (day_ahead, imbalance) {
            (Some(_), None) => Some(Market::DayAhead),
            (None, Some(_)) => Some(Market::Imbalance),
            (Some(day_ahead), Some(imbalance)) if day_ahead < imbalance => Some(Market::DayAhead),
            (Some(day_ahead), Some(imbalance)) if imbalance < day_ahead => Some(Market::Imbalance),
            _ => None,
        };
        Self { timestamp, day_ahead, imbalance, more_profitable }
    }
}

#[derive(Clone, Debug, Serialize)]
#[must_use]
pub struct ProfitComparison {
    /// Absent profits are excluded.
    #[serde(rename = "total_profit_day_ahead_eur")]
    pub total_day_ahead: Cost,

    #[serde(rename = "total_profit_imbalance_eur")]
    pub total_imbalance: Cost,

    /// Day-ahead only with the strictly lower total profit, imbalance otherwise.
    pub most_profitable_market: Market,

    pub rows: Vec<ProfitRow>,
}

impl ProfitComparison {
    /// Compare the markets hour by hour.
    #[instrument(skip_all)]
    pub fn compare(
        day_ahead: &MarketReport,
        imbalance: &MarketReport,
    ) -> Result<Self, AnalysisError> {
        let mut merged: BTreeMap<Timestamp, (Option<Cost>, Option<Cost>)> = BTreeMap::new();
        for bucket in resample_hourly(&day_ahead.intervals)? {
            merged.entry(bucket.timestamp).or_default().0 = bucket.profit();
        }
        for bucket in resample_hourly(&imbalance.intervals)? {
            merged.entry(bucket.timestamp).or_default().1 = bucket.profit();
        }

        let rows: Vec<ProfitRow> = merged
            .into_iter()
            .map(|(timestamp, (day_ahead, imbalance))| {
                ProfitRow::new(timestamp, day_ahead, imbalance)
            })
            .collect();
        let total_day_ahead: Cost = rows.iter().filter_map(|row| row.day_ahead).sum();
        let total_imbalance: Cost = rows.iter().filter_map(|row| row.imbalance).sum();
        let most_profitable_market =
            if total_day_ahead < total_imbalance { Market::DayAhead } else { Market::Imbalance };
        info!(
            n_rows = rows.len(),
            %total_day_ahead,
            %total_imbalance,
            %most_profitable_market,
            "compared",
        );
        Ok(Self { total_day_ahead, total_imbalance, most_profitable_market, rows })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{
        core::{demand::Demand, interval::PriceInterval, timestamp::parse_timestamp},
        quantity::{power::Kilowatts, rate::KilowattHourRate, time::Hours},
    };

    fn report(market: Market, rows: &[(&str, Option<Decimal>)], duration: Hours) -> MarketReport {
        let intervals = rows
            .iter()
            .map(|(timestamp, price)| {
                PriceInterval::new(
                    parse_timestamp(timestamp).unwrap(),
                    price.map(MegawattHourRate::from),
                    duration,
                )
            })
            .collect();
        MarketReport::evaluate(
            market,
            intervals,
            &Demand::Constant(Kilowatts::from(dec!(100))),
            KilowattHourRate::from(dec!(0.03)),
        )
        .unwrap()
    }

    #[test]
    fn test_imbalance_scenario() -> Result {
        let imbalance = report(
            Market::Imbalance,
            &[("2024-01-01 00:00", Some(dec!(-10))), ("2024-01-01 01:00", Some(dec!(5)))],
            Hours::QUARTER,
        );
        assert!(imbalance.intervals.iter().all(|result| result.decision == Decision::ElectricBoiler));

        let buckets = resample_hourly(&imbalance.intervals)?;
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].profit(), Some(Cost::from(dec!(-0.25))));
        assert_eq!(buckets[1].profit(), None);
        Ok(())
    }

    #[test]
    fn test_resample_averages_and_carries_the_decision() -> Result {
        let imbalance = report(
            Market::Imbalance,
            &[
                ("2024-01-01 00:00", Some(dec!(-10))),
                ("2024-01-01 00:15", Some(dec!(50))),
                ("2024-01-01 00:30", None),
                ("2024-01-01 02:15", Some(dec!(-6))),
            ],
            Hours::QUARTER,
        );
        let buckets = resample_hourly(&imbalance.intervals)?;
        assert_eq!(buckets.len(), 3);

        assert_eq!(buckets[0].price, Some(MegawattHourRate::from(dec!(20))));
        assert_eq!(buckets[0].decision, Some(Decision::ElectricBoiler));
        assert_eq!(buckets[0].profit(), None);

        assert_eq!(buckets[1].price, None);
        assert_eq!(buckets[1].decision, Some(Decision::Unknown));
        assert_eq!(buckets[1].profit(), None);

        // Decision at 02:00 is carried from 00:30:
        assert_eq!(buckets[2].decision, Some(Decision::Unknown));
        assert_eq!(buckets[2].profit(), Some(Cost::from(dec!(-0.15))));
        Ok(())
    }

    #[test]
    fn test_more_profitable() {
        let timestamp = parse_timestamp("2024-01-01 00:00").unwrap();
        let cost = |value| Some(Cost::from(value));

        let row = ProfitRow::new(timestamp, cost(dec!(-2)), cost(dec!(-1)));
        assert_eq!(row.more_profitable, Some(Market::DayAhead));

        let row = ProfitRow::new(timestamp, cost(dec!(-1)), cost(dec!(-2)));
        assert_eq!(row.more_profitable, Some(Market::Imbalance));

        let row = ProfitRow::new(timestamp, None, cost(dec!(3)));
        assert_eq!(row.more_profitable, Some(Market::Imbalance));

        let row = ProfitRow::new(timestamp, cost(Decimal::ZERO), None);
        assert_eq!(row.more_profitable, Some(Market::DayAhead));

        let row = ProfitRow::new(timestamp, cost(dec!(-1)), cost(dec!(-1)));
        assert_eq!(row.more_profitable, None);

        let row = ProfitRow::new(timestamp, None, None);
        assert_eq!(row.more_profitable, None);
    }

    /// Lower profit values win, following the sign convention of the cost formula.
    ///
    /// To be re-validated with the domain owners.
    #[test]
    fn test_compare() -> Result {
        let day_ahead = report(
            Market::DayAhead,
            &[
                ("2024-01-01 00:00", Some(dec!(-20))),
                ("2024-01-01 01:00", Some(dec!(10))),
                ("2024-01-01 02:00", Some(dec!(-1))),
            ],
            Hours::ONE,
        );
        let imbalance = report(
            Market::Imbalance,
            &[
                ("2024-01-01 00:00", Some(dec!(-40))),
                ("2024-01-01 00:15", Some(dec!(-40))),
                ("2024-01-01 00:30", Some(dec!(-40))),
                ("2024-01-01 00:45", Some(dec!(-40))),
                ("2024-01-01 03:00", Some(dec!(-100))),
            ],
            Hours::QUARTER,
        );
        let comparison = ProfitComparison::compare(&day_ahead, &imbalance)?;

        assert_eq!(comparison.rows.len(), 4);
        let [first, second, third, fourth] = comparison.rows[..] else { unreachable!() };

        // Day-ahead: 0.1 MW × -20 €/MWh = -2 €; imbalance: 0.1 MW × 0.25 h × -40 €/MWh = -1 €.
        assert_eq!(first.day_ahead, Some(Cost::from(dec!(-2))));
        assert_eq!(first.imbalance, Some(Cost::from(dec!(-1))));
        assert_eq!(first.more_profitable, Some(Market::DayAhead));

        assert_eq!(second.day_ahead, None);
        assert_eq!(second.imbalance, None);
        assert_eq!(second.more_profitable, None);

        assert_eq!(third.day_ahead, Some(Cost::from(dec!(-0.1))));
        assert_eq!(third.imbalance, None);
        assert_eq!(third.more_profitable, Some(Market::DayAhead));

        assert_eq!(fourth.day_ahead, None);
        assert_eq!(fourth.imbalance, Some(Cost::from(dec!(-2.5))));
        assert_eq!(fourth.more_profitable, Some(Market::Imbalance));

        assert_eq!(comparison.total_day_ahead, Cost::from(dec!(-2.1)));
        assert_eq!(comparison.total_imbalance, Cost::from(dec!(-3.5)));
        assert_eq!(comparison.most_profitable_market, Market::Imbalance);
        Ok(())
    }

    #[test]
    fn test_compare_day_ahead_wins() -> Result {
        let day_ahead =
            report(Market::DayAhead, &[("2024-01-01 00:00", Some(dec!(-20)))], Hours::ONE);
        let imbalance =
            report(Market::Imbalance, &[("2024-01-01 00:00", Some(dec!(-40)))], Hours::QUARTER);
        let comparison = ProfitComparison::compare(&day_ahead, &imbalance)?;
        assert_eq!(comparison.total_day_ahead, Cost::from(dec!(-2)));
        assert_eq!(comparison.total_imbalance, Cost::from(dec!(-1)));
        assert_eq!(comparison.most_profitable_market, Market::DayAhead);
        Ok(())
    }

    /// Equal totals go to the imbalance market.
    #[test]
    fn test_compare_without_negative_prices() -> Result {
        let day_ahead =
            report(Market::DayAhead, &[("2024-01-01 00:00", Some(dec!(1)))], Hours::ONE);
        let imbalance =
            report(Market::Imbalance, &[("2024-01-01 00:00", Some(dec!(2)))], Hours::QUARTER);
        let comparison = ProfitComparison::compare(&day_ahead, &imbalance)?;
        assert_eq!(comparison.rows.len(), 1);
        assert_eq!(comparison.rows[0].more_profitable, None);
        assert_eq!(comparison.total_day_ahead, Cost::ZERO);
        assert_eq!(comparison.total_imbalance, Cost::ZERO);
        assert_eq!(comparison.most_profitable_market, Market::Imbalance);
        Ok(())
    }
}
