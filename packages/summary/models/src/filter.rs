//! Typed filter predicates over record fields.
//!
//! The request-parsing layer turns query parameters such as
//! `time_received__gte=2015-01-01` into [`FilterPredicate`] values; record
//! sources evaluate them against anything implementing [`Filterable`].

use std::cmp::Ordering;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A named record field that predicates can test.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FilterField {
    // ── Calls ───────────────────────────────────────────
    /// Call identifier.
    CallId,
    /// When the call was received.
    TimeReceived,
    /// Day of week the call was received (Monday = 0).
    DowReceived,
    /// Hour of day the call was received.
    HourReceived,
    /// Nature identifier.
    Nature,
    /// Beat identifier.
    Beat,

    // ── Officer activities ──────────────────────────────
    /// Officer activity identifier.
    OfficerActivityId,
    /// When the activity was observed.
    Time,
    /// Activity-type identifier.
    ActivityType,
    /// Call-unit identifier.
    CallUnit,
    /// Linked call identifier.
    Call,
}

impl FilterField {
    /// Whether values for this field are timestamps.
    #[must_use]
    pub const fn is_temporal(self) -> bool {
        matches!(self, Self::TimeReceived | Self::Time)
    }
}

/// How a record's field value is compared against a predicate value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Comparator {
    /// Field equals the value.
    Eq,
    /// Field is greater than or equal to the value.
    Gte,
    /// Field is less than or equal to the value.
    Lte,
    /// Field is strictly greater than the value.
    Gt,
    /// Field is strictly less than the value.
    Lt,
}

impl Comparator {
    /// Whether `field.cmp(value) == ordering` satisfies this comparator.
    #[must_use]
    pub const fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => matches!(ordering, Ordering::Equal),
            Self::Gte => !matches!(ordering, Ordering::Less),
            Self::Lte => !matches!(ordering, Ordering::Greater),
            Self::Gt => matches!(ordering, Ordering::Greater),
            Self::Lt => matches!(ordering, Ordering::Less),
        }
    }
}

/// A typed predicate operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A timestamp.
    DateTime(NaiveDateTime),
    /// An integer (identifiers, weekday, hour).
    Int(i64),
}

impl FilterValue {
    /// Compares two values of the same kind. Values of different kinds are
    /// unordered.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<NaiveDateTime> for FilterValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// `field <comparator> value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPredicate {
    /// Field under test.
    pub field: FilterField,
    /// Comparison to apply.
    pub comparator: Comparator,
    /// Operand.
    pub value: FilterValue,
}

impl FilterPredicate {
    /// Creates a predicate.
    #[must_use]
    pub fn new(field: FilterField, comparator: Comparator, value: impl Into<FilterValue>) -> Self {
        Self {
            field,
            comparator,
            value: value.into(),
        }
    }

    /// `field == value`.
    #[must_use]
    pub fn equals(field: FilterField, value: impl Into<FilterValue>) -> Self {
        Self::new(field, Comparator::Eq, value)
    }

    /// `field >= value`.
    #[must_use]
    pub fn gte(field: FilterField, value: impl Into<FilterValue>) -> Self {
        Self::new(field, Comparator::Gte, value)
    }

    /// `field <= value`.
    #[must_use]
    pub fn lte(field: FilterField, value: impl Into<FilterValue>) -> Self {
        Self::new(field, Comparator::Lte, value)
    }

    /// Whether the record satisfies this predicate.
    ///
    /// A record without a value for the field never matches, mirroring SQL
    /// `NULL` comparison semantics.
    pub fn matches<R: Filterable + ?Sized>(&self, record: &R) -> bool {
        record
            .field_value(self.field)
            .and_then(|v| v.compare(&self.value))
            .is_some_and(|ordering| self.comparator.holds(ordering))
    }
}

/// A record that predicates can be evaluated against.
pub trait Filterable {
    /// Record kind used in error messages.
    const KIND: &'static str;

    /// Whether records of this kind carry the given field.
    fn supports(field: FilterField) -> bool;

    /// Primary timestamp, used for query bounds.
    fn timestamp(&self) -> NaiveDateTime;

    /// Value of a field, or `None` when the record leaves it empty or does
    /// not carry it.
    fn field_value(&self, field: FilterField) -> Option<FilterValue>;
}
