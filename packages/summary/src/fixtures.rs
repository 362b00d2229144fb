//! Shared in-memory fixtures for unit tests.

use cfs_summary_models::{
    ActivityType, ActivityTypeCatalog, Call, NewCall, OfficerActivity, ReferenceTables,
};
use chrono::NaiveDateTime;

pub fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
}

/// Two beats, two districts, one call unit in each, and the activity-type
/// ids the activity fixture uses.
pub fn references() -> ReferenceTables {
    let mut catalog = ActivityTypeCatalog::default();
    catalog.insert(1, ActivityType::InCallCitizenInitiated);
    catalog.insert(2, ActivityType::OutOfService);
    catalog.insert(3, ActivityType::OnDuty);

    ReferenceTables::new()
        .with_beat(1, "1")
        .with_beat(2, "2")
        .with_district(1, "A")
        .with_district(2, "B")
        .with_call_unit(1, "A1", 1, 1)
        .with_call_unit(2, "B2", 2, 2)
        .with_nature(1, "Robbery")
        .with_nature(2, "Homicide")
        .with_activity_types(catalog)
}

/// Six calls spread from January 2014 to February 2015.
pub fn volume_calls() -> Vec<Call> {
    [
        (1, "2014-01-15T09:00", Some(120), 1, Some(1)),
        (2, "2015-01-01T09:00", Some(600), 1, Some(2)),
        (3, "2015-01-01T12:30", Some(900), 2, Some(1)),
        (4, "2015-01-08T09:00", None, 1, Some(1)),
        (5, "2015-02-01T09:00", None, 2, None),
        (6, "2014-11-01T12:00", None, 1, None),
    ]
    .into_iter()
    .map(|(call_id, time, response, beat, nature)| {
        Call::try_from(NewCall {
            call_id: Some(call_id),
            time_received: Some(ts(time)),
            nature,
            beat: Some(beat),
            officer_response_secs: response,
        })
        .unwrap()
    })
    .collect()
}

/// Twelve activities: six busy ones and an on-duty record matching each.
pub fn activities() -> Vec<OfficerActivity> {
    [
        (1, 1, "2014-01-15T09:00", 1, Some(1)),
        (2, 1, "2014-01-15T09:10", 2, Some(1)),
        (3, 1, "2014-01-15T10:00", 1, Some(2)),
        (4, 1, "2014-01-16T09:50", 2, Some(2)),
        (5, 2, "2014-01-16T10:10", 1, None),
        (6, 2, "2014-01-18T09:00", 2, None),
        (7, 3, "2014-01-15T09:00", 1, None),
        (8, 3, "2014-01-15T09:10", 2, None),
        (9, 3, "2014-01-15T10:00", 1, None),
        (10, 3, "2014-01-16T09:50", 2, None),
        (11, 3, "2014-01-16T10:10", 1, None),
        (12, 3, "2014-01-18T09:00", 2, None),
    ]
    .into_iter()
    .map(|(id, kind, time, unit, call)| {
        let activity = OfficerActivity::new(id, kind, ts(time), unit);
        match call {
            Some(call) => activity.with_call(call),
            None => activity,
        }
    })
    .collect()
}
