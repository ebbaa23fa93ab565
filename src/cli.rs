mod analyse;
mod source;

use clap::{Parser, Subcommand};

pub use self::analyse::{AnalyseArgs, analyse};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare the e-boiler against the gas boiler on the historical market prices.
    #[clap(name = "analyse")]
    Analyse(Box<AnalyseArgs>),
}
