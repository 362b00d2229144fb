#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record, reference-table, and result types for calls-for-service overviews.
//!
//! The aggregation engine in `cfs_summary` consumes the record types defined
//! here ([`Call`], [`OfficerActivity`]) together with the read-only
//! [`ReferenceTables`], and produces the plain result shapes at the bottom of
//! this file. Every result type serializes to a flat structure of strings and
//! numbers so the transport layer can emit it without further conversion.

pub mod filter;
pub mod record;
pub mod reference;

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

pub use filter::{Comparator, FilterField, FilterPredicate, FilterValue, Filterable};
pub use record::{Call, NewCall, NewOfficerActivity, OfficerActivity};
pub use reference::{
    ActivityTypeCatalog, ActivityTypeRecord, Beat, CallUnit, District, Nature, ReferenceTables,
};

/// Errors raised while turning raw input rows into typed records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A field the aggregator depends on was absent from the input row.
    #[error("{record} is missing required field '{field}'")]
    MissingField {
        /// Record kind (e.g. `"call"`).
        record: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },

    /// An activity-type description did not match any known activity type.
    #[error("Unknown officer activity type '{descr}'")]
    UnknownActivityType {
        /// The unrecognized description.
        descr: String,
    },

    /// An id is missing from its reference table.
    #[error("Unknown {table} id {id}")]
    UnknownReference {
        /// Reference table name.
        table: &'static str,
        /// The unresolved identifier.
        id: i64,
    },
}

/// The fixed catalog of officer activity states.
///
/// Display names match the descriptions stored in the activity-type
/// reference table and are used verbatim as result keys.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum ActivityType {
    /// Assigned to a call a citizen reported.
    #[serde(rename = "IN CALL - CITIZEN INITIATED")]
    #[strum(serialize = "IN CALL - CITIZEN INITIATED")]
    InCallCitizenInitiated,
    /// Assigned to a call the officer initiated.
    #[serde(rename = "IN CALL - SELF INITIATED")]
    #[strum(serialize = "IN CALL - SELF INITIATED")]
    InCallSelfInitiated,
    /// Assigned to a directed-patrol call.
    #[serde(rename = "IN CALL - DIRECTED PATROL")]
    #[strum(serialize = "IN CALL - DIRECTED PATROL")]
    InCallDirectedPatrol,
    /// Unavailable for dispatch.
    #[serde(rename = "OUT OF SERVICE")]
    #[strum(serialize = "OUT OF SERVICE")]
    OutOfService,
    /// Rostered and on shift.
    #[serde(rename = "ON DUTY")]
    #[strum(serialize = "ON DUTY")]
    OnDuty,
    /// On general patrol.
    #[serde(rename = "PATROL")]
    #[strum(serialize = "PATROL")]
    Patrol,
}

impl ActivityType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::InCallCitizenInitiated,
            Self::InCallSelfInitiated,
            Self::InCallDirectedPatrol,
            Self::OutOfService,
            Self::OnDuty,
            Self::Patrol,
        ]
    }

    /// Whether this is the on-duty baseline state.
    #[must_use]
    pub const fn is_on_duty(self) -> bool {
        matches!(self, Self::OnDuty)
    }

    /// Whether this state counts toward the staffing baseline used for
    /// on-duty rates.
    ///
    /// Out-of-service records describe officers who are not available as
    /// staff and are left out of the denominator.
    #[must_use]
    pub const fn is_staffing_baseline(self) -> bool {
        !matches!(self, Self::OutOfService)
    }
}

/// Calendar unit used to bucket timestamps.
///
/// Variants are ordered from finest to coarsest.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Granularity {
    /// Midnight-aligned days.
    Day,
    /// Monday-aligned weeks.
    Week,
    /// Calendar months.
    Month,
    /// Calendar years.
    Year,
}

impl Granularity {
    /// Returns all variants of this enum, finest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Day, Self::Week, Self::Month, Self::Year]
    }
}

/// Inclusive bounds of the timestamps observed in a filtered record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    /// Earliest observed timestamp.
    pub min_time: NaiveDateTime,
    /// Latest observed timestamp.
    pub max_time: NaiveDateTime,
}

impl TimeSpan {
    /// Creates a span from two endpoints, in either order.
    #[must_use]
    pub fn new(a: NaiveDateTime, b: NaiveDateTime) -> Self {
        Self {
            min_time: a.min(b),
            max_time: a.max(b),
        }
    }

    /// Computes the span covering every timestamp, or `None` when there are
    /// no timestamps.
    pub fn from_timestamps(timestamps: impl IntoIterator<Item = NaiveDateTime>) -> Option<Self> {
        timestamps.into_iter().fold(None, |span, ts| {
            Some(span.map_or_else(
                || Self::new(ts, ts),
                |s: Self| Self::new(s.min_time.min(ts), s.max_time.max(ts)),
            ))
        })
    }

    /// Elapsed time between the endpoints.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.max_time - self.min_time
    }

    /// First calendar date the span touches.
    #[must_use]
    pub const fn first_date(&self) -> NaiveDate {
        self.min_time.date()
    }

    /// Last calendar date the span touches.
    #[must_use]
    pub const fn last_date(&self) -> NaiveDate {
        self.max_time.date()
    }

    /// Number of calendar dates the span touches, counting both ends.
    #[must_use]
    pub fn calendar_days(&self) -> u64 {
        let days = (self.last_date() - self.first_date()).num_days() + 1;
        u64::try_from(days).unwrap_or(1)
    }

    /// Whether both endpoints fall on midnight.
    #[must_use]
    pub fn is_day_aligned(&self) -> bool {
        self.min_time.time() == NaiveTime::MIN && self.max_time.time() == NaiveTime::MIN
    }

    /// Counts the calendar dates in the span falling on each weekday,
    /// indexed Monday = 0 through Sunday = 6.
    #[must_use]
    pub fn weekday_occurrences(&self) -> [u64; 7] {
        let total = self.calendar_days();
        let first = u64::from(self.first_date().weekday().num_days_from_monday());
        let mut counts = [total / 7; 7];
        for offset in 0..total % 7 {
            #[allow(clippy::cast_possible_truncation)]
            let dow = ((first + offset) % 7) as usize;
            counts[dow] += 1;
        }
        counts
    }
}

/// Call count for one time bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumePoint {
    /// Start of the bucket.
    pub date: NaiveDateTime,
    /// Number of calls received in the bucket.
    pub volume: u64,
}

/// One cell of the day-of-week by hour-of-day call heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    /// Day of week, Monday = 0.
    pub dow_received: u8,
    /// Hour of day, 0-23.
    pub hour_received: u8,
    /// Calls received in this weekday/hour slot.
    pub total: u64,
    /// Occurrences of this weekday within the query span.
    pub freq: u64,
    /// `total / freq`.
    pub volume: f64,
}

/// Frequency-normalized count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricCell {
    /// Raw record count.
    pub total: u64,
    /// Number of opportunities the count is averaged over.
    pub freq: u64,
    /// `total / freq`, or zero when `freq` is zero.
    pub avg_volume: f64,
}

impl MetricCell {
    /// Builds a cell, guarding the division when `freq` is zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(total: u64, freq: u64) -> Self {
        let avg_volume = if freq == 0 {
            0.0
        } else {
            total as f64 / freq as f64
        };
        Self {
            total,
            freq,
            avg_volume,
        }
    }
}

/// Time-of-day key (`HH:MM:SS`) -> activity display name -> metric cell.
pub type AllocationOverTime = BTreeMap<String, BTreeMap<String, MetricCell>>;

/// On-duty rate for one beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatOnDuty {
    /// Beat identifier.
    pub beat_id: i64,
    /// Beat description.
    pub beat: String,
    /// Fraction of staffing-baseline records that were on duty.
    pub on_duty: f64,
}

/// On-duty rate for one district.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictOnDuty {
    /// District identifier.
    pub district_id: i64,
    /// District description.
    pub district: String,
    /// Fraction of staffing-baseline records that were on duty.
    pub on_duty: f64,
}

/// Call count for one beat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatVolume {
    /// Beat identifier.
    pub beat_id: i64,
    /// Beat description.
    pub beat: String,
    /// Calls received in the beat.
    pub volume: u64,
}

/// Call count for one call nature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatureVolume {
    /// Nature identifier.
    pub nature_id: i64,
    /// Nature description.
    pub nature: String,
    /// Calls received with this nature.
    pub volume: u64,
}

/// Mean officer response time for one beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatResponseTime {
    /// Beat identifier.
    pub beat_id: i64,
    /// Beat description.
    pub beat: String,
    /// Mean response duration in seconds.
    pub mean_response_secs: f64,
}

/// Every call-volume series under its transport key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallVolumeDict {
    /// Granularity used for `volume_by_date`; absent for an empty snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<Granularity>,
    /// Calls per occupied time bucket.
    pub volume_by_date: Vec<VolumePoint>,
    /// Weekday by hour heatmap.
    pub day_hour_heatmap: Vec<HeatmapCell>,
    /// Calls per beat.
    pub volume_by_beat: Vec<BeatVolume>,
    /// Calls per nature.
    pub volume_by_nature: Vec<NatureVolume>,
    /// Mean response time per beat.
    pub response_time_by_beat: Vec<BeatResponseTime>,
}

/// Every officer-activity series under its transport key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficerActivityDict {
    /// Activity breakdown by time of day.
    pub allocation_over_time: AllocationOverTime,
    /// On-duty rate per beat.
    pub on_duty_by_beat: Vec<BeatOnDuty>,
    /// On-duty rate per district.
    pub on_duty_by_district: Vec<DistrictOnDuty>,
}
