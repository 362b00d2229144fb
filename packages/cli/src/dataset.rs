//! JSON dataset file holding the reference tables and both record kinds.
//!
//! Records arrive as untyped rows and are validated into [`Call`] and
//! [`OfficerActivity`] values; a row missing a required field fails the
//! whole load. An empty `activity_types` list means the standard catalog.

use std::path::Path;

use cfs_summary_models::{
    ActivityTypeRecord, Beat, Call, CallUnit, District, Nature, NewCall, NewOfficerActivity,
    OfficerActivity, RecordError, ReferenceTables,
};
use serde::Deserialize;
use thiserror::Error;

/// Failure to read or validate a dataset file.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Everything the overviews need, as stored on disk.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub beats: Vec<Beat>,
    pub districts: Vec<District>,
    pub call_units: Vec<CallUnit>,
    pub natures: Vec<Nature>,
    pub activity_types: Vec<ActivityTypeRecord>,
    pub calls: Vec<NewCall>,
    pub officer_activities: Vec<NewOfficerActivity>,
}

impl Dataset {
    /// Reads and parses a dataset file.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the file cannot be read or is not valid
    /// dataset JSON.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let contents = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let dataset = Self::from_json_str(&contents)?;
        log::info!(
            "Loaded {} call(s) and {} officer activity record(s) from {}",
            dataset.calls.len(),
            dataset.officer_activities.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Parses a dataset from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Json`] if the text is not valid dataset JSON.
    pub fn from_json_str(s: &str) -> Result<Self, DatasetError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Builds the keyed reference tables.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Record`] if an activity-type row names an
    /// unknown state.
    pub fn references(&self) -> Result<ReferenceTables, DatasetError> {
        Ok(ReferenceTables::from_rows(
            self.beats.clone(),
            self.districts.clone(),
            self.call_units.clone(),
            self.natures.clone(),
            self.activity_types.clone(),
        )?)
    }

    /// Validates the call rows.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Record`] for the first row missing a required
    /// field.
    pub fn calls(&self) -> Result<Vec<Call>, DatasetError> {
        Ok(self
            .calls
            .iter()
            .cloned()
            .map(Call::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// Validates the officer-activity rows.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Record`] for the first row missing a required
    /// field.
    pub fn officer_activities(&self) -> Result<Vec<OfficerActivity>, DatasetError> {
        Ok(self
            .officer_activities
            .iter()
            .cloned()
            .map(OfficerActivity::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use cfs_summary_models::ActivityType;

    use super::*;

    const SAMPLE: &str = r#"{
        "beats": [{ "beat_id": 1, "descr": "1" }],
        "districts": [{ "district_id": 1, "descr": "A" }],
        "call_units": [{ "call_unit_id": 7, "descr": "A1", "beat": 1, "district": 1 }],
        "natures": [{ "nature_id": 3, "descr": "Robbery" }],
        "activity_types": [
            { "officer_activity_type_id": 1, "descr": "ON DUTY" },
            { "officer_activity_type_id": 2, "descr": "OUT OF SERVICE" }
        ],
        "calls": [
            { "call_id": 10, "time_received": "2015-01-01T09:00:00", "beat": 1, "nature": 3 }
        ],
        "officer_activities": [
            { "officer_activity_id": 20, "activity_type": 1, "time": "2015-01-01T09:05:00", "call_unit": 7 }
        ]
    }"#;

    #[test]
    fn loads_references_and_records() {
        let dataset = Dataset::from_json_str(SAMPLE).unwrap();

        let references = dataset.references().unwrap();
        assert_eq!(references.beats.len(), 1);
        assert_eq!(
            references.activity_types.resolve(2),
            Some(ActivityType::OutOfService)
        );
        assert!(references.placement(7).is_ok());

        let calls = dataset.calls().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].dow_received, 3);
        assert_eq!(calls[0].hour_received, 9);
        assert_eq!(calls[0].officer_response_secs, None);

        let activities = dataset.officer_activities().unwrap();
        assert_eq!(activities[0].call_unit, 7);
        assert_eq!(activities[0].call, None);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let dataset = Dataset::from_json_str("{}").unwrap();
        assert!(dataset.calls().unwrap().is_empty());
        assert_eq!(
            dataset.references().unwrap().activity_types.len(),
            ActivityType::all().len()
        );
    }

    #[test]
    fn row_missing_required_field_fails() {
        let dataset =
            Dataset::from_json_str(r#"{ "calls": [{ "call_id": 1, "beat": 2 }] }"#).unwrap();
        assert!(matches!(
            dataset.calls().unwrap_err(),
            DatasetError::Record(RecordError::MissingField { .. })
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            Dataset::from_json_str("{ \"calls\": ").unwrap_err(),
            DatasetError::Json(_)
        ));
    }
}
