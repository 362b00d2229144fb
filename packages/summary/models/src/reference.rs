//! Read-only dimension tables: geography and the activity-type catalog.
//!
//! These are passed explicitly to each overview rather than looked up
//! globally, so tests can build synthetic tables in a few lines.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ActivityType, RecordError};

/// A patrol beat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beat {
    /// Beat identifier.
    pub beat_id: i64,
    /// Display description.
    pub descr: String,
}

/// A police district.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    /// District identifier.
    pub district_id: i64,
    /// Display description.
    pub descr: String,
}

/// A dispatchable unit. Each unit belongs to exactly one beat and one
/// district.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallUnit {
    /// Call-unit identifier.
    pub call_unit_id: i64,
    /// Display description.
    pub descr: String,
    /// Owning beat.
    pub beat: i64,
    /// Owning district.
    pub district: i64,
}

/// A call nature (e.g. "Robbery").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nature {
    /// Nature identifier.
    pub nature_id: i64,
    /// Display description.
    pub descr: String,
}

/// A row of the activity-type reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTypeRecord {
    /// Activity-type identifier.
    pub officer_activity_type_id: i64,
    /// Display description, one of the [`ActivityType`] names.
    pub descr: String,
}

/// Maps activity-type identifiers to [`ActivityType`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityTypeCatalog {
    types: BTreeMap<i64, ActivityType>,
}

impl ActivityTypeCatalog {
    /// Catalog with identifiers 1 through 6 assigned in
    /// [`ActivityType::all`] order.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            types: (1..).zip(ActivityType::all().iter().copied()).collect(),
        }
    }

    /// Builds a catalog from reference-table rows.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnknownActivityType`] if a description does not
    /// name a known activity type.
    pub fn from_records(
        records: impl IntoIterator<Item = ActivityTypeRecord>,
    ) -> Result<Self, RecordError> {
        let mut catalog = Self::default();
        for record in records {
            let descr = record.descr.trim();
            let kind = descr.parse::<ActivityType>().map_err(|_| {
                RecordError::UnknownActivityType {
                    descr: descr.to_string(),
                }
            })?;
            catalog.insert(record.officer_activity_type_id, kind);
        }
        Ok(catalog)
    }

    /// Assigns an identifier to an activity type.
    pub fn insert(&mut self, id: i64, kind: ActivityType) {
        self.types.insert(id, kind);
    }

    /// Looks up the activity type for an identifier.
    #[must_use]
    pub fn resolve(&self, id: i64) -> Option<ActivityType> {
        self.types.get(&id).copied()
    }

    /// Number of identifiers in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the catalog has no identifiers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Every dimension table an overview may consult.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTables {
    /// Beats by identifier.
    pub beats: BTreeMap<i64, Beat>,
    /// Districts by identifier.
    pub districts: BTreeMap<i64, District>,
    /// Call units by identifier.
    pub call_units: BTreeMap<i64, CallUnit>,
    /// Natures by identifier.
    pub natures: BTreeMap<i64, Nature>,
    /// Activity-type catalog.
    pub activity_types: ActivityTypeCatalog,
}

impl ReferenceTables {
    /// Empty tables with the standard activity-type catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            activity_types: ActivityTypeCatalog::standard(),
            ..Self::default()
        }
    }

    /// Adds a beat.
    #[must_use]
    pub fn with_beat(mut self, beat_id: i64, descr: impl Into<String>) -> Self {
        self.beats.insert(
            beat_id,
            Beat {
                beat_id,
                descr: descr.into(),
            },
        );
        self
    }

    /// Adds a district.
    #[must_use]
    pub fn with_district(mut self, district_id: i64, descr: impl Into<String>) -> Self {
        self.districts.insert(
            district_id,
            District {
                district_id,
                descr: descr.into(),
            },
        );
        self
    }

    /// Adds a call unit.
    #[must_use]
    pub fn with_call_unit(
        mut self,
        call_unit_id: i64,
        descr: impl Into<String>,
        beat: i64,
        district: i64,
    ) -> Self {
        self.call_units.insert(
            call_unit_id,
            CallUnit {
                call_unit_id,
                descr: descr.into(),
                beat,
                district,
            },
        );
        self
    }

    /// Adds a nature.
    #[must_use]
    pub fn with_nature(mut self, nature_id: i64, descr: impl Into<String>) -> Self {
        self.natures.insert(
            nature_id,
            Nature {
                nature_id,
                descr: descr.into(),
            },
        );
        self
    }

    /// Replaces the activity-type catalog.
    #[must_use]
    pub fn with_activity_types(mut self, catalog: ActivityTypeCatalog) -> Self {
        self.activity_types = catalog;
        self
    }

    /// Builds tables from reference-table rows.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnknownActivityType`] if an activity-type row
    /// names an unknown type.
    pub fn from_rows(
        beats: Vec<Beat>,
        districts: Vec<District>,
        call_units: Vec<CallUnit>,
        natures: Vec<Nature>,
        activity_types: Vec<ActivityTypeRecord>,
    ) -> Result<Self, RecordError> {
        let activity_types = if activity_types.is_empty() {
            ActivityTypeCatalog::standard()
        } else {
            ActivityTypeCatalog::from_records(activity_types)?
        };

        Ok(Self {
            beats: beats.into_iter().map(|b| (b.beat_id, b)).collect(),
            districts: districts.into_iter().map(|d| (d.district_id, d)).collect(),
            call_units: call_units
                .into_iter()
                .map(|u| (u.call_unit_id, u))
                .collect(),
            natures: natures.into_iter().map(|n| (n.nature_id, n)).collect(),
            activity_types,
        })
    }

    /// Beat and district a call unit belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnknownReference`] naming the first of the call
    /// unit, its beat, or its district that is missing.
    pub fn placement(&self, call_unit_id: i64) -> Result<(&Beat, &District), RecordError> {
        let unit = self
            .call_units
            .get(&call_unit_id)
            .ok_or(RecordError::UnknownReference {
                table: "call_unit",
                id: call_unit_id,
            })?;
        let beat = self
            .beats
            .get(&unit.beat)
            .ok_or(RecordError::UnknownReference {
                table: "beat",
                id: unit.beat,
            })?;
        let district =
            self.districts
                .get(&unit.district)
                .ok_or(RecordError::UnknownReference {
                    table: "district",
                    id: unit.district,
                })?;
        Ok((beat, district))
    }
}
