use thiserror::Error;

use crate::core::market::{Column, Market};

/// Terminal failures of an analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The upstream or uploaded payload lacks an expected column.
    ///
    /// Only the affected market is aborted.
    #[error("{market} prices are missing the `{column}` column")]
    MissingColumn { market: Market, column: Column },

    #[error("no {0} prices are available for the requested period")]
    EmptySeries(Market),

    #[error("malformed demand upload: {0}")]
    MalformedUpload(String),

    #[error("failed to fetch {market} prices")]
    Upstream {
        market: Market,

        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to align the timestamps on an hourly grid")]
    Timeline(#[from] chrono::RoundingError),
}

impl AnalysisError {
    /// Whether the error aborts only one market rather than the whole run.
    #[must_use]
    pub const fn is_market_local(&self) -> bool {
        matches!(self, Self::MissingColumn { .. })
    }
}
