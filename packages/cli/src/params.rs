//! Parsing of `field__comparator=value` filter arguments.
//!
//! The comparator suffix is optional and defaults to equality:
//!
//! * `beat=3`
//! * `time_received__gte=2015-01-01`
//! * `time__lt=2015-01-01T12:00:00`
//!
//! Timestamp fields accept a full datetime or a bare date. A bare date
//! means the start of that day, except under `lte` and `gt` where it means
//! the end of that day, so `time_received__lte=2015-01-31` includes the
//! whole of the 31st.

use cfs_summary_models::{Comparator, FilterField, FilterPredicate, FilterValue};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// A filter argument that could not be understood.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    /// No `=` separating the key from the value.
    #[error("Filter '{param}' is missing '=value'")]
    MissingValue { param: String },

    /// The field name is not a filterable field.
    #[error("Unknown filter field '{field}'")]
    UnknownField { field: String },

    /// The suffix after `__` is not a comparator.
    #[error("Unknown comparator '{comparator}'")]
    UnknownComparator { comparator: String },

    /// A timestamp field was given something that is not a date or datetime.
    #[error("Invalid date or datetime '{value}' for {field}")]
    InvalidDateTime { field: FilterField, value: String },

    /// An integer field was given a non-integer.
    #[error("Invalid integer '{value}' for {field}")]
    InvalidInteger { field: FilterField, value: String },
}

/// Parses one `field__comparator=value` argument.
///
/// # Errors
///
/// Returns a [`ParamError`] describing the first part that failed to parse.
pub fn parse_filter(param: &str) -> Result<FilterPredicate, ParamError> {
    let (key, raw) = param
        .split_once('=')
        .ok_or_else(|| ParamError::MissingValue {
            param: param.to_string(),
        })?;

    let (field_name, comparator) = match key.split_once("__") {
        Some((field, suffix)) => {
            let comparator =
                suffix
                    .parse::<Comparator>()
                    .map_err(|_| ParamError::UnknownComparator {
                        comparator: suffix.to_string(),
                    })?;
            (field, comparator)
        }
        None => (key, Comparator::Eq),
    };

    let field = field_name
        .trim()
        .parse::<FilterField>()
        .map_err(|_| ParamError::UnknownField {
            field: field_name.to_string(),
        })?;

    let raw = raw.trim();
    let value = if field.is_temporal() {
        FilterValue::DateTime(parse_timestamp(field, comparator, raw)?)
    } else {
        FilterValue::Int(
            raw.parse::<i64>()
                .map_err(|_| ParamError::InvalidInteger {
                    field,
                    value: raw.to_string(),
                })?,
        )
    };

    Ok(FilterPredicate::new(field, comparator, value))
}

/// Parses every argument, stopping at the first failure.
///
/// # Errors
///
/// Returns the first [`ParamError`] encountered.
pub fn parse_filters<S: AsRef<str>>(params: &[S]) -> Result<Vec<FilterPredicate>, ParamError> {
    params.iter().map(|p| parse_filter(p.as_ref())).collect()
}

fn parse_timestamp(
    field: FilterField,
    comparator: Comparator,
    raw: &str,
) -> Result<NaiveDateTime, ParamError> {
    let invalid = || ParamError::InvalidDateTime {
        field,
        value: raw.to_string(),
    };

    if let Some(ts) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Ok(ts);
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())?;
    let time = match comparator {
        Comparator::Lte | Comparator::Gt => {
            NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).ok_or_else(invalid)?
        }
        Comparator::Eq | Comparator::Gte | Comparator::Lt => NaiveTime::MIN,
    };
    Ok(date.and_time(time))
}
