//! Uploaded demand series: a CSV file with the `Time` and `Desired Power` (kW) columns.

use std::{collections::BTreeMap, fs::File, io::Read, path::Path};

use crate::{
    api::csv_files::{Table, parse_decimal},
    core::{
        demand::Demand,
        timestamp::{Timestamp, parse_timestamp},
    },
    error::AnalysisError,
    prelude::*,
    quantity::power::Kilowatts,
};

const TIME: &str = "Time";
const DESIRED_POWER: &str = "Desired Power";

#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_demand(path: &Path) -> Result<Demand, AnalysisError> {
    let file = File::open(path).map_err(|error| {
        AnalysisError::MalformedUpload(format!("failed to open `{}`: {error}", path.display()))
    })?;
    parse_demand(file)
}

pub fn parse_demand(reader: impl Read) -> Result<Demand, AnalysisError> {
    let series = parse_series(reader)
        .map_err(|error| AnalysisError::MalformedUpload(format!("{error:#}")))?;
    info!(n_points = series.len(), "read the uploaded demand");
    Ok(Demand::Uploaded(series))
}

fn parse_series(reader: impl Read) -> Result<BTreeMap<Timestamp, Kilowatts>> {
    let table = Table::from_reader(reader)?;
    ensure!(
        table.position(TIME).is_some() && table.position(DESIRED_POWER).is_some(),
        "the file must contain the `{TIME}` and `{DESIRED_POWER}` columns",
    );
    let mut series = BTreeMap::new();
    for row in &table.rows {
        let (Some(time), Some(power)) = (table.cell(row, TIME), table.cell(row, DESIRED_POWER))
        else {
            warn!(?row, "skipping the incomplete row");
            continue;
        };
        let power = Kilowatts::from(parse_decimal(power)?);
        ensure!(!power.is_negative(), "desired power must not be negative: `{power}`");
        series.insert(parse_timestamp(time)?, power);
    }
    ensure!(!series.is_empty(), "the file contains no demand");
    Ok(series)
}
