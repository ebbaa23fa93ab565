use std::collections::BTreeMap;

use crate::{
    core::timestamp::Timestamp,
    error::AnalysisError,
    prelude::*,
    quantity::power::Kilowatts,
};

/// Requested boiler power over the analysis window.
#[derive(Clone, Debug)]
pub enum Demand {
    /// Same power for every interval.
    Constant(Kilowatts),

    /// Sparse uploaded series, matched to the price timeline by exact timestamp.
    Uploaded(BTreeMap<Timestamp, Kilowatts>),
}

impl Demand {
    /// Resolve the demand for every timestamp of the timeline.
    ///
    /// Uploaded values are merged by exact timestamp, then forward-filled,
    /// then backward-filled.
    pub fn resolve(&self, timeline: &[Timestamp]) -> Result<Vec<Kilowatts>, AnalysisError> {
        match self {
            Self::Constant(power) => Ok(vec![*power; timeline.len()]),
            Self::Uploaded(series) => {
                let mut merged: Vec<Option<Kilowatts>> =
                    timeline.iter().map(|timestamp| series.get(timestamp).copied()).collect();
                let n_matched = merged.iter().flatten().count();
                if n_matched == 0 && !timeline.is_empty() {
                    return Err(AnalysisError::MalformedUpload(
                        "none of the uploaded timestamps match the price timeline".to_string(),
                    ));
                }
                debug!(n_matched, n_intervals = timeline.len(), "merged the uploaded demand");
                forward_fill(merged.iter_mut());
                forward_fill(merged.iter_mut().rev());
                Ok(merged.into_iter().flatten().collect())
            }
        }
    }
}

fn forward_fill<'a>(values: impl Iterator<Item = &'a mut Option<Kilowatts>>) {
    let mut last = None;
    for value in values {
        if let Some(power) = *value {
            last = Some(power);
        } else {
            *value = last;
        }
    }
}
