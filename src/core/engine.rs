//! Single analysis run over both markets.

use bon::Builder;
use serde::Serialize;

use crate::{
    api::price_source::PriceSource,
    core::{
        aggregator::MarketReport,
        comparator::ProfitComparison,
        demand::Demand,
        market::Market,
        normalizer::{Resolution, normalize_day_ahead, normalize_imbalance},
        period::Period,
    },
    error::AnalysisError,
    prelude::*,
    quantity::rate::KilowattHourRate,
};

#[derive(Builder)]
#[must_use]
pub struct Request {
    #[builder(into)]
    pub country: String,

    pub period: Period,

    /// Fixed gas price.
    pub gas_rate: KilowattHourRate,

    pub demand: Demand,

    /// Fallback day-ahead cadence.
    #[builder(default)]
    pub day_ahead_resolution: Resolution,
}

/// Market that could not be evaluated while the run went on.
#[derive(Clone, Debug, Serialize)]
pub struct MarketFailure {
    pub market: Market,
    pub reason: String,
}

#[derive(Clone, Debug, Default, Serialize)]
#[must_use]
pub struct RunReport {
    pub day_ahead: Option<MarketReport>,
    pub imbalance: Option<MarketReport>,

    /// Only available when both markets have been evaluated.
    pub comparison: Option<ProfitComparison>,

    pub failures: Vec<MarketFailure>,
}

impl RunReport {
    fn absorb(
        &mut self,
        market: Market,
        result: Result<MarketReport, AnalysisError>,
    ) -> Result<Option<MarketReport>, AnalysisError> {
        match result {
            Ok(report) => Ok(Some(report)),
            Err(error) if error.is_market_local() => {
                warn!(%market, "skipping the market: {error:#}");
                self.failures.push(MarketFailure { market, reason: error.to_string() });
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }
}

/// Fetch, normalize and evaluate both markets, then compare them.
#[instrument(skip_all, fields(country = %request.country, period = ?request.period))]
pub fn run(source: &dyn PriceSource, request: &Request) -> Result<RunReport, AnalysisError> {
    let mut report = RunReport::default();

    let day_ahead = evaluate_day_ahead(source, request);
    report.day_ahead = report.absorb(Market::DayAhead, day_ahead)?;

    let imbalance = evaluate_imbalance(source, request);
    report.imbalance = report.absorb(Market::Imbalance, imbalance)?;

    if let (Some(day_ahead), Some(imbalance)) = (&report.day_ahead, &report.imbalance) {
        report.comparison = Some(ProfitComparison::compare(day_ahead, imbalance)?);
    } else {
        warn!("skipping the cross-market comparison");
    }
    Ok(report)
}

fn evaluate_day_ahead(
    source: &dyn PriceSource,
    request: &Request,
) -> Result<MarketReport, AnalysisError> {
    let payload = source
        .fetch_day_ahead(&request.country, request.period)
        .map_err(|error| AnalysisError::Upstream {
            market: Market::DayAhead,
            source: error.into(),
        })?
        .retain_within(request.period, |record| record.timestamp);
    let intervals = normalize_day_ahead(payload, request.day_ahead_resolution)?;
    MarketReport::evaluate(Market::DayAhead, intervals, &request.demand, request.gas_rate)
}

fn evaluate_imbalance(
    source: &dyn PriceSource,
    request: &Request,
) -> Result<MarketReport, AnalysisError> {
    let payload = source
        .fetch_imbalance(&request.country, request.period)
        .map_err(|error| AnalysisError::Upstream {
            market: Market::Imbalance,
            source: error.into(),
        })?
        .retain_within(request.period, |record| record.timestamp);
    let intervals = normalize_imbalance(payload)?;
    MarketReport::evaluate(Market::Imbalance, intervals, &request.demand, request.gas_rate)
}
