#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation engine for the calls-for-service operations dashboard.
//!
//! Both overviews follow the same path: a [`query::BoundedQuery`] snapshots
//! the filtered records and their observed time bounds, the
//! [`bucket::TimeBucketer`] picks a calendar granularity for the span, and
//! the overview groups and normalizes the snapshot into the plain result
//! shapes from `cfs_summary_models`.
//!
//! Nothing here performs I/O beyond the single fetch from a
//! [`query::RecordSource`] at construction time.

pub mod bucket;
pub mod call_volume;
pub mod config;
pub mod officer_activity;
pub mod query;

#[cfg(test)]
pub(crate) mod fixtures;

pub use call_volume::CallVolumeOverview;
pub use config::SummaryConfig;
pub use officer_activity::OfficerActivityOverview;
pub use query::{BoundedQuery, RecordSource};

use cfs_summary_models::{FilterField, RecordError};
use thiserror::Error;

/// Errors that can occur while building an overview.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// An input row could not be turned into a typed record.
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// A predicate names a field the record kind does not carry.
    #[error("Cannot filter {record} records on field '{field}'")]
    UnsupportedField {
        /// The offending field.
        field: FilterField,
        /// Record kind being filtered.
        record: &'static str,
    },

    /// A record refers to a dimension row missing from the reference tables.
    #[error("Unknown {table} id {id}")]
    UnknownReference {
        /// Reference table name.
        table: &'static str,
        /// The unresolved identifier.
        id: i64,
    },

    /// Configuration failed to parse or validate.
    #[error("Config error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },

    /// The record source failed to produce records.
    #[error("Record source error: {message}")]
    Source {
        /// Description of what went wrong.
        message: String,
    },
}
