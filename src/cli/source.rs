use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::{
    api::{csv_files, entsoe, price_source::PriceSource},
    prelude::*,
};

#[derive(Copy, Clone, Default, ValueEnum)]
pub enum Source {
    /// ENTSO-E Transparency Platform.
    #[default]
    Entsoe,

    /// Exported CSV files.
    Csv,
}

#[derive(Parser)]
pub struct SourceArgs {
    #[clap(long, value_enum, default_value_t, env = "PRICE_SOURCE")]
    pub source: Source,

    /// ENTSO-E Transparency Platform security token.
    #[clap(long = "entsoe-api-token", env = "ENTSOE_API_TOKEN", hide_env_values = true)]
    pub entsoe_api_token: Option<String>,

    /// Day-ahead prices with the `Time` and `Price` (€/MWh) columns.
    #[clap(long = "day-ahead-csv", env = "DAY_AHEAD_CSV")]
    pub day_ahead_csv: Option<PathBuf>,

    /// Imbalance prices with the `Time`, `Long` and `Short` (€/MWh) columns.
    #[clap(long = "imbalance-csv", env = "IMBALANCE_CSV")]
    pub imbalance_csv: Option<PathBuf>,
}

impl SourceArgs {
    pub fn price_source(&self) -> Result<Box<dyn PriceSource>> {
        match self.source {
            Source::Entsoe => {
                let token = self
                    .entsoe_api_token
                    .clone()
                    .context("`--entsoe-api-token` is required for the ENTSO-E source")?;
                Ok(Box::new(entsoe::Api::new(token)))
            }
            Source::Csv => {
                let day_ahead = self
                    .day_ahead_csv
                    .clone()
                    .context("`--day-ahead-csv` is required for the CSV source")?;
                let imbalance = self
                    .imbalance_csv
                    .clone()
                    .context("`--imbalance-csv` is required for the CSV source")?;
                Ok(Box::new(csv_files::Files { day_ahead, imbalance }))
            }
        }
    }
}
