use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::{
    api::upload::read_demand,
    cli::source::SourceArgs,
    core::{
        demand::Demand,
        engine::{Request, run},
        normalizer::Resolution,
        period::Period,
    },
    prelude::*,
    quantity::{
        power::Kilowatts,
        rate::{KilowattHourRate, MegawattHourRate},
    },
    report::{ReportFormat, write_report},
    tables::{
        build_comparison_table,
        build_intervals_table,
        build_power_table,
        build_prices_table,
        build_summary_table,
    },
};

#[derive(Parser)]
pub struct AnalyseArgs {
    /// First day of the analysis window.
    #[clap(long, env = "START")]
    pub start: NaiveDate,

    /// Day after the analysis window, exclusive.
    #[clap(long, env = "END")]
    pub end: NaiveDate,

    /// Bidding zone, for example `NL` or `BE`.
    #[clap(long, default_value = "NL", env = "COUNTRY")]
    pub country: String,

    /// Fixed gas price.
    #[clap(long = "gas-price-per-kwh", default_value = "0.03", env = "GAS_PRICE_PER_KWH")]
    pub gas_price: KilowattHourRate,

    /// Boiler power, used when no demand file is given.
    #[clap(
        long = "desired-power-kilowatts",
        default_value = "100",
        env = "DESIRED_POWER_KILOWATTS"
    )]
    pub desired_power: Kilowatts,

    /// CSV file with the `Time` and `Desired Power` (kW) columns.
    #[clap(long = "demand-file", env = "DEMAND_FILE")]
    pub demand_file: Option<PathBuf>,

    /// Day-ahead cadence for price sources that do not state it.
    #[clap(
        long = "day-ahead-resolution",
        value_enum,
        default_value_t,
        env = "DAY_AHEAD_RESOLUTION"
    )]
    pub day_ahead_resolution: Resolution,

    #[clap(flatten)]
    pub source: SourceArgs,

    /// Write the machine-readable report to the file.
    #[clap(long = "report", env = "REPORT_PATH")]
    pub report_path: Option<PathBuf>,

    #[clap(long = "report-format", value_enum, default_value_t, env = "REPORT_FORMAT")]
    pub report_format: ReportFormat,

    /// Print the per-interval tables.
    #[clap(long)]
    pub show_intervals: bool,
}

impl AnalyseArgs {
    fn demand(&self) -> Result<Demand> {
        match &self.demand_file {
            Some(path) => Ok(read_demand(path)?),
            None => Ok(Demand::Constant(self.desired_power)),
        }
    }
}

#[instrument(skip_all, fields(start = %args.start, end = %args.end, country = %args.country))]
pub fn analyse(args: &AnalyseArgs) -> Result {
    let request = Request::builder()
        .country(&args.country)
        .period(Period::try_from_dates(args.start, args.end)?)
        .gas_rate(args.gas_price)
        .demand(args.demand()?)
        .day_ahead_resolution(args.day_ahead_resolution)
        .build();
    let source = args.source.price_source()?;
    let report = run(source.as_ref(), &request)?;

    let market_reports: Vec<_> =
        [&report.day_ahead, &report.imbalance].into_iter().flatten().collect();
    if args.show_intervals {
        for market_report in &market_reports {
            println!("{}", market_report.market);
            println!("{}", build_intervals_table(market_report));
        }
        let gas_price = MegawattHourRate::from(args.gas_price);
        println!("{}", build_prices_table(&market_reports, gas_price));
    }
    if !market_reports.is_empty() {
        println!("{}", build_summary_table(&market_reports));
        println!("{}", build_power_table(&market_reports));
    }
    if let Some(comparison) = &report.comparison {
        println!("{}", build_comparison_table(comparison));
    }
    for failure in &report.failures {
        warn!(market = %failure.market, reason = %failure.reason, "market skipped");
    }

    if let Some(path) = &args.report_path {
        write_report(&report, path, args.report_format)?;
    }
    Ok(())
}
