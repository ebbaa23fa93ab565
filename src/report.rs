//! Machine-readable run report.

use std::{fs, path::Path};

use clap::ValueEnum;

use crate::{core::engine::RunReport, prelude::*};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Json,

    Toml,
}

impl ReportFormat {
    pub fn render(self, report: &RunReport) -> Result<String> {
        match self {
            Self::Json => Ok(serde_json::to_string_pretty(report)?),
            Self::Toml => Ok(toml::to_string_pretty(report)?),
        }
    }
}

#[instrument(skip_all, fields(path = %path.display(), format = ?format))]
pub fn write_report(report: &RunReport, path: &Path, format: ReportFormat) -> Result {
    let rendered = format.render(report).context("failed to render the report")?;
    fs::write(path, rendered)
        .with_context(|| format!("failed to write the report to `{}`", path.display()))?;
    info!("written the report");
    Ok(())
}
