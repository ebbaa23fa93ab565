use std::collections::BTreeMap;

use chrono::{DurationRound, RoundingError, TimeDelta};

use crate::core::timestamp::Timestamp;

impl<T> Bucket for T where T: ?Sized {}

pub trait Bucket {
    /// Group the points into contiguous buckets of `time_delta` keyed by the bucket start.
    ///
    /// Buckets between the first and the last point with no points in them
    /// are kept as empty vectors.
    fn bucket<V>(self, time_delta: TimeDelta) -> Result<Vec<(Timestamp, Vec<V>)>, RoundingError>
    where
        Self: Iterator<Item = (Timestamp, V)> + Sized,
    {
        let mut buckets: BTreeMap<Timestamp, Vec<V>> = BTreeMap::new();
        for (timestamp, value) in self {
            buckets.entry(timestamp.duration_trunc(time_delta)?).or_default().push(value);
        }
        let (Some(&first), Some(&last)) = (buckets.keys().next(), buckets.keys().next_back())
        else {
            return Ok(Vec::new());
        };

        let mut contiguous = Vec::with_capacity(buckets.len());
        let mut start = first;
        while start <= last {
            contiguous.push((start, buckets.remove(&start).unwrap_or_default()));
            start += time_delta;
        }
        Ok(contiguous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::timestamp::parse_timestamp, prelude::*};

    #[test]
    fn test_bucket_hourly() -> Result {
        let series = [
            ("2024-01-01 10:00", 1),
            ("2024-01-01 10:15", 2),
            ("2024-01-01 10:45", 3),
            ("2024-01-01 12:30", 4),
        ]
        .map(|(timestamp, value)| (parse_timestamp(timestamp).unwrap(), value));

        let buckets = series.into_iter().bucket(TimeDelta::hours(1))?;

        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0], (parse_timestamp("2024-01-01 10:00")?, vec![1, 2, 3]));
        assert_eq!(buckets[1], (parse_timestamp("2024-01-01 11:00")?, vec![]));
        assert_eq!(buckets[2], (parse_timestamp("2024-01-01 12:00")?, vec![4]));
        Ok(())
    }

    #[test]
    fn test_bucket_across_dst_switch() -> Result {
        // Clocks go from 02:00 to 03:00 on this night:
        let series = [("2024-03-31T01:30:00+01:00", 1), ("2024-03-31T03:15:00+02:00", 2)]
            .map(|(timestamp, value)| (parse_timestamp(timestamp).unwrap(), value));
        let buckets = series.into_iter().bucket(TimeDelta::hours(1))?;
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[1].1, vec![2]);
        Ok(())
    }

    #[test]
    fn test_bucket_empty() -> Result {
        let buckets = std::iter::empty::<(Timestamp, i32)>().bucket(TimeDelta::hours(1))?;
        assert!(buckets.is_empty());
        Ok(())
    }
}
