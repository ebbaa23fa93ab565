use std::fmt::{Debug, Formatter};

use chrono::NaiveDate;

use crate::{
    core::timestamp::{Timestamp, start_of_day},
    prelude::*,
};

/// Requested analysis window.
#[derive(Copy, Clone, Eq, PartialEq)]
#[must_use]
pub struct Period {
    /// Inclusive.
    pub start: Timestamp,

    /// Exclusive.
    pub end: Timestamp,
}

impl Debug for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl Period {
    /// Build the period from midnight of `start` until midnight of `end`.
    pub fn try_from_dates(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        ensure!(start < end, "the start date `{start}` must precede the end date `{end}`");
        Ok(Self { start: start_of_day(start)?, end: start_of_day(end)? })
    }

    #[must_use]
    pub fn contains(self, other: Timestamp) -> bool {
        (self.start <= other) && (other < self.end)
    }
}
