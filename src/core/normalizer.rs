//! Alignment of raw upstream price series to [`PriceInterval`]s.

use std::iter::once;

use enumset::EnumSet;
use itertools::Itertools;

use crate::{
    api::price_source::{DayAheadRecord, ImbalanceRecord, Payload},
    core::{
        interval::PriceInterval,
        market::{Column, Market},
        timestamp::Timestamp,
    },
    error::AnalysisError,
    prelude::*,
    quantity::time::Hours,
};

/// Native cadence of the day-ahead auction.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum Resolution {
    #[default]
    Quarterly,

    Hourly,
}

impl Resolution {
    pub const fn duration(self) -> Hours {
        match self {
            Self::Quarterly => Hours::QUARTER,
            Self::Hourly => Hours::ONE,
        }
    }
}

/// Normalize the day-ahead series.
///
/// The duration is the cadence stated by the upstream, or the fallback resolution otherwise.
#[instrument(skip_all, fields(n_records = payload.records.len()))]
pub fn normalize_day_ahead(
    payload: Payload<DayAheadRecord>,
    fallback: Resolution,
) -> Result<Vec<PriceInterval>, AnalysisError> {
    require_columns(Market::DayAhead, payload.columns, Column::Time | Column::Price)?;
    let records = into_strictly_increasing(Market::DayAhead, payload.records, |record| {
        record.timestamp
    })?;
    Ok(records
        .into_iter()
        .map(|record| {
            let duration = record.duration.unwrap_or_else(|| fallback.duration());
            PriceInterval::new(record.timestamp, record.price, duration)
        })
        .collect())
}

/// Normalize the imbalance series.
///
/// The price is the mean of the long and short prices. The duration is the gap
/// to the previous row, the first row defaults to a quarter of an hour.
#[instrument(skip_all, fields(n_records = payload.records.len()))]
pub fn normalize_imbalance(
    payload: Payload<ImbalanceRecord>,
) -> Result<Vec<PriceInterval>, AnalysisError> {
    require_columns(
        Market::Imbalance,
        payload.columns,
        Column::Time | Column::Long | Column::Short,
    )?;
    let records = into_strictly_increasing(Market::Imbalance, payload.records, |record| {
        record.timestamp
    })?;
    let durations = once(Hours::QUARTER).chain(
        records
            .iter()
            .tuple_windows()
            .map(|(previous, next)| Hours::from_time_delta(next.timestamp - previous.timestamp)),
    );
    Ok(records
        .iter()
        .zip(durations)
        .map(|(record, duration)| PriceInterval::new(record.timestamp, record.average(), duration))
        .collect())
}

fn require_columns(
    market: Market,
    present: EnumSet<Column>,
    required: EnumSet<Column>,
) -> Result<(), AnalysisError> {
    match (required - present).iter().next() {
        Some(column) => Err(AnalysisError::MissingColumn { market, column }),
        None => Ok(()),
    }
}

fn into_strictly_increasing<R>(
    market: Market,
    mut records: Vec<R>,
    timestamp: impl Fn(&R) -> Timestamp,
) -> Result<Vec<R>, AnalysisError> {
    if records.is_empty() {
        return Err(AnalysisError::EmptySeries(market));
    }
    records.sort_by_key(&timestamp);
    let n_records = records.len();
    records.dedup_by_key(|record| timestamp(record));
    if records.len() != n_records {
        warn!(%market, n_duplicates = n_records - records.len(), "dropped duplicate timestamps");
    }
    debug!(%market, n_intervals = records.len(), "normalized");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{core::timestamp::parse_timestamp, quantity::rate::MegawattHourRate};

    fn imbalance(timestamp: &str, long: Option<i64>, short: Option<i64>) -> ImbalanceRecord {
        ImbalanceRecord {
            timestamp: parse_timestamp(timestamp).unwrap(),
            long: long.map(|price| MegawattHourRate::from(rust_decimal::Decimal::from(price))),
            short: short.map(|price| MegawattHourRate::from(rust_decimal::Decimal::from(price))),
        }
    }

    fn imbalance_payload(records: Vec<ImbalanceRecord>) -> Payload<ImbalanceRecord> {
        Payload { columns: Column::Time | Column::Long | Column::Short, records }
    }

    #[test]
    fn test_single_row_defaults_to_quarter() -> Result {
        let intervals = normalize_imbalance(imbalance_payload(vec![imbalance(
            "2024-01-01 00:00",
            Some(10),
            Some(20),
        )]))?;
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].duration.0, dec!(0.25));
        assert_eq!(intervals[0].price, Some(MegawattHourRate::from(dec!(15))));
        Ok(())
    }

    #[test]
    fn test_gap_sets_later_duration() -> Result {
        let intervals = normalize_imbalance(imbalance_payload(vec![
            imbalance("2024-01-01 00:45", Some(1), Some(1)),
            imbalance("2024-01-01 00:00", Some(1), Some(1)),
        ]))?;
        assert_eq!(intervals[0].duration, Hours::QUARTER);
        assert_eq!(intervals[1].duration.0, dec!(0.75));
        assert_eq!(intervals[1].timestamp - intervals[0].timestamp, TimeDelta::minutes(45));
        Ok(())
    }

    #[test]
    fn test_one_sided_imbalance_price() -> Result {
        let intervals = normalize_imbalance(imbalance_payload(vec![
            imbalance("2024-01-01 00:00", None, Some(-4)),
            imbalance("2024-01-01 00:15", None, None),
        ]))?;
        assert_eq!(intervals[0].price, Some(MegawattHourRate::from(dec!(-4))));
        assert_eq!(intervals[1].price, None);
        Ok(())
    }

    #[test]
    fn test_duplicates_are_dropped() -> Result {
        let intervals = normalize_imbalance(imbalance_payload(vec![
            imbalance("2024-01-01 00:00", Some(1), Some(1)),
            imbalance("2024-01-01 00:00", Some(2), Some(2)),
            imbalance("2024-01-01 00:15", Some(3), Some(3)),
        ]))?;
        assert_eq!(intervals.len(), 2);
        assert!(intervals.iter().tuple_windows().all(|(lhs, rhs)| lhs.timestamp < rhs.timestamp));
        Ok(())
    }

    #[test]
    fn test_day_ahead_duration_is_fixed() -> Result {
        let payload = Payload {
            columns: Column::Time | Column::Price,
            records: vec![
                DayAheadRecord {
                    timestamp: parse_timestamp("2024-01-01 00:00")?,
                    price: Some(MegawattHourRate::from(dec!(20))),
                    duration: None,
                },
                DayAheadRecord {
                    timestamp: parse_timestamp("2024-01-01 03:00")?,
                    price: None,
                    duration: None,
                },
            ],
        };
        let intervals = normalize_day_ahead(payload, Resolution::Hourly)?;
        assert!(intervals.iter().all(|interval| interval.duration == Hours::ONE));
        assert_eq!(intervals[1].price, None);
        Ok(())
    }

    #[test]
    fn test_day_ahead_native_duration_wins() -> Result {
        let payload = Payload {
            columns: Column::Time | Column::Price,
            records: vec![
                DayAheadRecord {
                    timestamp: parse_timestamp("2024-01-01 00:00")?,
                    price: Some(MegawattHourRate::from(dec!(20))),
                    duration: Some(Hours::ONE),
                },
                DayAheadRecord {
                    timestamp: parse_timestamp("2024-01-01 01:00")?,
                    price: Some(MegawattHourRate::from(dec!(30))),
                    duration: None,
                },
            ],
        };
        let intervals = normalize_day_ahead(payload, Resolution::Quarterly)?;
        assert_eq!(intervals[0].duration, Hours::ONE);
        assert_eq!(intervals[0].end(), parse_timestamp("2024-01-01 01:00")?);
        assert_eq!(intervals[1].duration, Hours::QUARTER);
        Ok(())
    }

    #[test]
    fn test_missing_column() {
        let payload = Payload { columns: Column::Time | Column::Long, records: Vec::new() };
        assert!(matches!(
            normalize_imbalance(payload),
            Err(AnalysisError::MissingColumn { market: Market::Imbalance, column: Column::Short })
        ));
    }

    #[test]
    fn test_empty_series() {
        let payload = Payload { columns: Column::Time | Column::Price, records: Vec::new() };
        assert!(matches!(
            normalize_day_ahead(payload, Resolution::Quarterly),
            Err(AnalysisError::EmptySeries(Market::DayAhead))
        ));
    }
}
