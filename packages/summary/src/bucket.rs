//! Adaptive calendar bucketing.
//!
//! [`TimeBucketer::granularity_for`] coarsens the bucket size as the span of a
//! query grows; [`TimeBucketer::buckets_for`] walks the bucket starts that
//! cover a span at a given granularity.

use cfs_summary_models::{Granularity, TimeSpan};
use chrono::{Datelike, Days, Months, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::SummaryError;

/// Inclusive upper bound, in days, of the span each granularity handles.
///
/// Spans longer than `month_max_days` are bucketed by year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketThresholds {
    /// Longest span bucketed by day.
    pub day_max_days: i64,
    /// Longest span bucketed by week.
    pub week_max_days: i64,
    /// Longest span bucketed by month.
    pub month_max_days: i64,
}

impl Default for BucketThresholds {
    fn default() -> Self {
        Self {
            day_max_days: 180,
            week_max_days: 365,
            month_max_days: 1826,
        }
    }
}

impl BucketThresholds {
    /// Checks that the thresholds are non-negative, strictly increasing, and
    /// representable as a [`TimeDelta`].
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Config`] otherwise.
    pub fn validate(&self) -> Result<(), SummaryError> {
        for (name, days) in [
            ("day_max_days", self.day_max_days),
            ("week_max_days", self.week_max_days),
            ("month_max_days", self.month_max_days),
        ] {
            if TimeDelta::try_days(days).is_none() {
                return Err(SummaryError::Config {
                    message: format!("bucket threshold {name} = {days} is out of range"),
                });
            }
        }

        if self.day_max_days < 0
            || self.day_max_days >= self.week_max_days
            || self.week_max_days >= self.month_max_days
        {
            return Err(SummaryError::Config {
                message: format!(
                    "bucket thresholds must satisfy 0 <= day ({}) < week ({}) < month ({})",
                    self.day_max_days, self.week_max_days, self.month_max_days
                ),
            });
        }
        Ok(())
    }
}

/// Chooses and enumerates calendar buckets for a time span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeBucketer {
    thresholds: BucketThresholds,
}

impl TimeBucketer {
    /// Creates a bucketer with validated thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Config`] if the thresholds are not strictly
    /// increasing.
    pub fn new(thresholds: BucketThresholds) -> Result<Self, SummaryError> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    /// Picks the granularity for a span. Longer spans never get a finer
    /// granularity than shorter ones.
    #[must_use]
    pub fn granularity_for(&self, span: &TimeSpan) -> Granularity {
        let length = span.duration();
        let granularity = if within(length, self.thresholds.day_max_days) {
            Granularity::Day
        } else if within(length, self.thresholds.week_max_days) {
            Granularity::Week
        } else if within(length, self.thresholds.month_max_days) {
            Granularity::Month
        } else {
            Granularity::Year
        };

        log::debug!(
            "granularity_for: span {} -> {} ({granularity})",
            span.min_time,
            span.max_time
        );
        granularity
    }

    /// Truncates a timestamp to the start of its bucket: midnight, Monday,
    /// the first of the month, or January 1.
    #[must_use]
    pub fn truncate(ts: NaiveDateTime, granularity: Granularity) -> NaiveDateTime {
        let date = ts.date();
        let start = match granularity {
            Granularity::Day => date,
            Granularity::Week => date - Days::new(u64::from(date.weekday().num_days_from_monday())),
            Granularity::Month => date - Days::new(u64::from(date.day0())),
            Granularity::Year => date - Days::new(u64::from(date.ordinal0())),
        };
        start.and_time(NaiveTime::MIN)
    }

    /// Lazily yields the start of every bucket overlapping the span, in
    /// order. Always yields at least one bucket.
    #[must_use]
    pub fn buckets_for(span: &TimeSpan, granularity: Granularity) -> BucketIter {
        BucketIter {
            next: Some(Self::truncate(span.min_time, granularity)),
            end: span.max_time,
            granularity,
        }
    }

    /// Number of buckets, partial ones included, the span touches at this
    /// granularity. Never less than one.
    #[must_use]
    pub fn freq_for(span: &TimeSpan, granularity: Granularity) -> u64 {
        let count = Self::buckets_for(span, granularity).count();
        u64::try_from(count).unwrap_or(u64::MAX).max(1)
    }
}

/// Whether `length` fits in `max_days`. A limit too large for a
/// [`TimeDelta`] holds every span.
fn within(length: TimeDelta, max_days: i64) -> bool {
    TimeDelta::try_days(max_days).is_none_or(|limit| length <= limit)
}

/// Iterator over bucket starts, returned by [`TimeBucketer::buckets_for`].
#[derive(Debug, Clone)]
pub struct BucketIter {
    next: Option<NaiveDateTime>,
    end: NaiveDateTime,
    granularity: Granularity,
}

impl Iterator for BucketIter {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|start| *start <= self.end)?;
        self.next = match self.granularity {
            Granularity::Day => current.checked_add_days(Days::new(1)),
            Granularity::Week => current.checked_add_days(Days::new(7)),
            Granularity::Month => current.checked_add_months(Months::new(1)),
            Granularity::Year => current.checked_add_months(Months::new(12)),
        };
        Some(current)
    }
}
