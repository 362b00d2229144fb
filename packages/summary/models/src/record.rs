//! Call and officer-activity records.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::RecordError;
use crate::filter::{FilterField, FilterValue, Filterable};

/// A call for service.
///
/// `dow_received` and `hour_received` are derived from `time_received` when
/// the record is created and are never recomputed downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// Call identifier.
    pub call_id: i64,
    /// When the call was received.
    pub time_received: NaiveDateTime,
    /// Day of week received, Monday = 0.
    pub dow_received: u8,
    /// Hour of day received, 0-23.
    pub hour_received: u8,
    /// Nature identifier.
    pub nature: Option<i64>,
    /// Beat identifier.
    pub beat: Option<i64>,
    /// Seconds between dispatch and officer arrival.
    pub officer_response_secs: Option<u64>,
}

impl Call {
    /// Creates a call, deriving the weekday and hour it was received.
    #[must_use]
    pub fn new(call_id: i64, time_received: NaiveDateTime) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let dow_received = time_received.weekday().num_days_from_monday() as u8;
        #[allow(clippy::cast_possible_truncation)]
        let hour_received = time_received.hour() as u8;

        Self {
            call_id,
            time_received,
            dow_received,
            hour_received,
            nature: None,
            beat: None,
            officer_response_secs: None,
        }
    }

    /// Sets the nature.
    #[must_use]
    pub const fn with_nature(mut self, nature: i64) -> Self {
        self.nature = Some(nature);
        self
    }

    /// Sets the beat.
    #[must_use]
    pub const fn with_beat(mut self, beat: i64) -> Self {
        self.beat = Some(beat);
        self
    }

    /// Sets the officer response duration.
    #[must_use]
    pub const fn with_officer_response_secs(mut self, secs: u64) -> Self {
        self.officer_response_secs = Some(secs);
        self
    }
}

/// A call row as it arrives from ingestion, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCall {
    /// Call identifier.
    pub call_id: Option<i64>,
    /// When the call was received.
    pub time_received: Option<NaiveDateTime>,
    /// Nature identifier.
    #[serde(default)]
    pub nature: Option<i64>,
    /// Beat identifier.
    #[serde(default)]
    pub beat: Option<i64>,
    /// Seconds between dispatch and officer arrival.
    #[serde(default)]
    pub officer_response_secs: Option<u64>,
}

impl TryFrom<NewCall> for Call {
    type Error = RecordError;

    fn try_from(value: NewCall) -> Result<Self, Self::Error> {
        let call_id = value.call_id.ok_or(RecordError::MissingField {
            record: Self::KIND,
            field: "call_id",
        })?;
        let time_received = value.time_received.ok_or(RecordError::MissingField {
            record: Self::KIND,
            field: "time_received",
        })?;

        let mut call = Self::new(call_id, time_received);
        call.nature = value.nature;
        call.beat = value.beat;
        call.officer_response_secs = value.officer_response_secs;
        Ok(call)
    }
}

impl Filterable for Call {
    const KIND: &'static str = "call";

    fn supports(field: FilterField) -> bool {
        matches!(
            field,
            FilterField::CallId
                | FilterField::TimeReceived
                | FilterField::DowReceived
                | FilterField::HourReceived
                | FilterField::Nature
                | FilterField::Beat
        )
    }

    fn timestamp(&self) -> NaiveDateTime {
        self.time_received
    }

    fn field_value(&self, field: FilterField) -> Option<FilterValue> {
        match field {
            FilterField::CallId => Some(self.call_id.into()),
            FilterField::TimeReceived => Some(self.time_received.into()),
            FilterField::DowReceived => Some(i64::from(self.dow_received).into()),
            FilterField::HourReceived => Some(i64::from(self.hour_received).into()),
            FilterField::Nature => self.nature.map(Into::into),
            FilterField::Beat => self.beat.map(Into::into),
            _ => None,
        }
    }
}

/// One observation of an officer unit's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerActivity {
    /// Activity identifier.
    pub officer_activity_id: i64,
    /// Activity-type identifier, resolved through the activity-type catalog.
    pub activity_type: i64,
    /// When the state was observed.
    pub time: NaiveDateTime,
    /// Call-unit identifier.
    pub call_unit: i64,
    /// Linked call, when the unit was assigned to one.
    pub call: Option<i64>,
}

impl OfficerActivity {
    /// Creates an activity with no linked call.
    #[must_use]
    pub const fn new(
        officer_activity_id: i64,
        activity_type: i64,
        time: NaiveDateTime,
        call_unit: i64,
    ) -> Self {
        Self {
            officer_activity_id,
            activity_type,
            time,
            call_unit,
            call: None,
        }
    }

    /// Links the activity to a call.
    #[must_use]
    pub const fn with_call(mut self, call: i64) -> Self {
        self.call = Some(call);
        self
    }
}

/// An officer-activity row as it arrives from ingestion, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOfficerActivity {
    /// Activity identifier.
    pub officer_activity_id: Option<i64>,
    /// Activity-type identifier.
    pub activity_type: Option<i64>,
    /// When the state was observed.
    pub time: Option<NaiveDateTime>,
    /// Call-unit identifier.
    pub call_unit: Option<i64>,
    /// Linked call identifier.
    #[serde(default)]
    pub call: Option<i64>,
}

impl TryFrom<NewOfficerActivity> for OfficerActivity {
    type Error = RecordError;

    fn try_from(value: NewOfficerActivity) -> Result<Self, Self::Error> {
        let missing = |field| RecordError::MissingField {
            record: Self::KIND,
            field,
        };

        Ok(Self {
            officer_activity_id: value
                .officer_activity_id
                .ok_or_else(|| missing("officer_activity_id"))?,
            activity_type: value
                .activity_type
                .ok_or_else(|| missing("activity_type"))?,
            time: value.time.ok_or_else(|| missing("time"))?,
            call_unit: value.call_unit.ok_or_else(|| missing("call_unit"))?,
            call: value.call,
        })
    }
}

impl Filterable for OfficerActivity {
    const KIND: &'static str = "officer_activity";

    fn supports(field: FilterField) -> bool {
        matches!(
            field,
            FilterField::OfficerActivityId
                | FilterField::Time
                | FilterField::ActivityType
                | FilterField::CallUnit
                | FilterField::Call
        )
    }

    fn timestamp(&self) -> NaiveDateTime {
        self.time
    }

    fn field_value(&self, field: FilterField) -> Option<FilterValue> {
        match field {
            FilterField::OfficerActivityId => Some(self.officer_activity_id.into()),
            FilterField::Time => Some(self.time.into()),
            FilterField::ActivityType => Some(self.activity_type.into()),
            FilterField::CallUnit => Some(self.call_unit.into()),
            FilterField::Call => self.call.map(Into::into),
            _ => None,
        }
    }
}
