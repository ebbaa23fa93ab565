//! Offline price source reading the exported price series from CSV files.
//!
//! Day-ahead files carry the `Time` and `Price` columns, imbalance files carry
//! the `Time`, `Long` and `Short` columns. Prices are in €/MWh, empty cells
//! stand for missing prices.

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};

use csv::{ReaderBuilder, StringRecord, Trim};
use enumset::EnumSet;
use rust_decimal::Decimal;

use crate::{
    api::price_source::{DayAheadRecord, ImbalanceRecord, Payload, PriceSource},
    core::{
        market::Column,
        period::Period,
        timestamp::{Timestamp, parse_timestamp},
    },
    prelude::*,
    quantity::rate::MegawattHourRate,
};

pub struct Files {
    pub day_ahead: PathBuf,
    pub imbalance: PathBuf,
}

impl PriceSource for Files {
    #[instrument(skip_all, fields(path = %self.day_ahead.display()))]
    fn fetch_day_ahead(&self, _country: &str, _period: Period) -> Result<Payload<DayAheadRecord>> {
        let table = Table::from_reader(open(&self.day_ahead)?)?;
        let columns = table.columns();
        if !columns.contains(Column::Time) {
            warn!("no `{}` column, skipping the rows", Column::Time);
            return Ok(Payload { columns, records: Vec::new() });
        }
        let records = table
            .rows
            .iter()
            .map(|row| {
                Ok(DayAheadRecord {
                    timestamp: table.timestamp(row)?,
                    price: table.price(row, Column::Price)?,
                    duration: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        info!(n_records = records.len(), "read the day-ahead prices");
        Ok(Payload { columns, records })
    }

    #[instrument(skip_all, fields(path = %self.imbalance.display()))]
    fn fetch_imbalance(&self, _country: &str, _period: Period) -> Result<Payload<ImbalanceRecord>> {
        let table = Table::from_reader(open(&self.imbalance)?)?;
        let columns = table.columns();
        if !columns.contains(Column::Time) {
            warn!("no `{}` column, skipping the rows", Column::Time);
            return Ok(Payload { columns, records: Vec::new() });
        }
        let records = table
            .rows
            .iter()
            .map(|row| {
                Ok(ImbalanceRecord {
                    timestamp: table.timestamp(row)?,
                    long: table.price(row, Column::Long)?,
                    short: table.price(row, Column::Short)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        info!(n_records = records.len(), "read the imbalance prices");
        Ok(Payload { columns, records })
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("failed to open `{}`", path.display()))
}

/// Headers and rows of a CSV file.
pub struct Table {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl Table {
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).flexible(true).from_reader(reader);
        let headers = reader.headers().context("failed to read the headers")?.clone();
        let rows = reader
            .records()
            .enumerate()
            .map(|(index, row)| row.with_context(|| format!("failed to read row #{}", index + 1)))
            .collect::<Result<_>>()?;
        Ok(Self { headers, rows })
    }

    #[must_use]
    pub fn position(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|name| name == header)
    }

    /// Known price columns present in the headers.
    #[must_use]
    pub fn columns(&self) -> EnumSet<Column> {
        [Column::Time, Column::Price, Column::Long, Column::Short]
            .into_iter()
            .filter(|column| self.position(&column.to_string()).is_some())
            .collect()
    }

    /// Non-empty cell under the header.
    pub fn cell<'a>(&self, row: &'a StringRecord, header: &str) -> Option<&'a str> {
        self.position(header).and_then(|index| row.get(index)).filter(|cell| !cell.is_empty())
    }

    pub fn timestamp(&self, row: &StringRecord) -> Result<Timestamp> {
        let cell = self
            .cell(row, &Column::Time.to_string())
            .with_context(|| format!("missing `{}` in {row:?}", Column::Time))?;
        parse_timestamp(cell)
    }

    pub fn price(&self, row: &StringRecord, column: Column) -> Result<Option<MegawattHourRate>> {
        self.cell(row, &column.to_string())
            .map(|cell| parse_decimal(cell).map(MegawattHourRate::from))
            .transpose()
    }
}

pub fn parse_decimal(text: &str) -> Result<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .with_context(|| format!("`{text}` is not a valid number"))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_table() -> Result {
        let table = Table::from_reader("Time,Long,Short\n2024-01-01 00:00, -10 ,\n".as_bytes())?;
        assert_eq!(table.columns(), Column::Time | Column::Long | Column::Short);
        assert_eq!(table.rows.len(), 1);
        let row = &table.rows[0];
        assert_eq!(table.timestamp(row)?, parse_timestamp("2024-01-01T00:00:00+01:00")?);
        assert_eq!(table.price(row, Column::Long)?, Some(MegawattHourRate::from(dec!(-10))));
        assert_eq!(table.price(row, Column::Short)?, None);
        assert_eq!(table.price(row, Column::Price)?, None);
        Ok(())
    }

    #[test]
    fn test_missing_column() -> Result {
        let table = Table::from_reader("Time,Cost\n2024-01-01 00:00,1\n".as_bytes())?;
        assert_eq!(table.columns(), EnumSet::only(Column::Time));
        Ok(())
    }

    #[test]
    fn test_missing_time_column_yields_no_records() -> Result {
        let directory = tempfile::tempdir()?;
        let day_ahead = directory.path().join("day-ahead.csv");
        std::fs::write(&day_ahead, "Timestamp,Price\n2024-01-01 00:00,20\n")?;
        let files = Files { day_ahead, imbalance: directory.path().join("imbalance.csv") };
        let period = Period::try_from_dates(
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).context("invalid date")?,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 2).context("invalid date")?,
        )?;

        let payload = files.fetch_day_ahead("NL", period)?;
        assert_eq!(payload.columns, EnumSet::only(Column::Price));
        assert!(payload.records.is_empty());
        Ok(())
    }

    #[test]
    fn test_invalid_price() -> Result {
        let table = Table::from_reader("Time,Price\n2024-01-01 00:00,cheap\n".as_bytes())?;
        assert!(table.price(&table.rows[0], Column::Price).is_err());
        Ok(())
    }

    #[test]
    fn test_parse_decimal() -> Result {
        assert_eq!(parse_decimal("1.5")?, dec!(1.5));
        assert_eq!(parse_decimal("1e2")?, dec!(100));
        Ok(())
    }
}
