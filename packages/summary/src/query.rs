//! Filtered, bounded snapshots of a record collection.

use cfs_summary_models::{FilterPredicate, Filterable, TimeSpan};

use crate::SummaryError;

/// A collection of records that can be narrowed by predicates.
///
/// Implemented for in-memory slices; a database-backed store implements it
/// by translating the predicates into its own query language.
pub trait RecordSource<R> {
    /// Returns every record matching all predicates.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Source`] if the underlying store fails.
    fn fetch(&self, predicates: &[FilterPredicate]) -> Result<Vec<R>, SummaryError>;
}

impl<R: Filterable + Clone> RecordSource<R> for [R] {
    fn fetch(&self, predicates: &[FilterPredicate]) -> Result<Vec<R>, SummaryError> {
        Ok(self
            .iter()
            .filter(|record| predicates.iter().all(|p| p.matches(*record)))
            .cloned()
            .collect())
    }
}

impl<R: Filterable + Clone> RecordSource<R> for Vec<R> {
    fn fetch(&self, predicates: &[FilterPredicate]) -> Result<Vec<R>, SummaryError> {
        self.as_slice().fetch(predicates)
    }
}

/// The records matching a predicate set, fetched once, plus the time span
/// they cover.
///
/// The snapshot is immutable; every aggregate computed from the same query
/// sees the same records.
#[derive(Debug, Clone)]
pub struct BoundedQuery<R> {
    predicates: Vec<FilterPredicate>,
    records: Vec<R>,
    bounds: Option<TimeSpan>,
}

impl<R: Filterable> BoundedQuery<R> {
    /// Fetches the records matching `predicates` from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::UnsupportedField`] if a predicate names a field
    /// this record kind does not carry, or whatever error the source raises.
    pub fn new<S: RecordSource<R> + ?Sized>(
        source: &S,
        predicates: Vec<FilterPredicate>,
    ) -> Result<Self, SummaryError> {
        if let Some(predicate) = predicates.iter().find(|p| !R::supports(p.field)) {
            return Err(SummaryError::UnsupportedField {
                field: predicate.field,
                record: R::KIND,
            });
        }

        let records = source.fetch(&predicates)?;
        let bounds = TimeSpan::from_timestamps(records.iter().map(Filterable::timestamp));

        match &bounds {
            Some(span) => log::debug!(
                "BoundedQuery: {} {} record(s) from {} to {}",
                records.len(),
                R::KIND,
                span.min_time,
                span.max_time
            ),
            None => log::debug!("BoundedQuery: no {} records matched", R::KIND),
        }

        Ok(Self {
            predicates,
            records,
            bounds,
        })
    }

    /// Wraps an already-filtered set of records.
    #[must_use]
    pub fn from_records(records: Vec<R>) -> Self {
        let bounds = TimeSpan::from_timestamps(records.iter().map(Filterable::timestamp));
        Self {
            predicates: Vec::new(),
            records,
            bounds,
        }
    }

    /// Span of the primary timestamps, or `None` when nothing matched.
    #[must_use]
    pub const fn bounds(&self) -> Option<&TimeSpan> {
        self.bounds.as_ref()
    }

    /// The matching records. May be iterated any number of times.
    #[must_use]
    pub fn filtered_records(&self) -> &[R] {
        &self.records
    }

    /// Predicates the snapshot was taken with.
    #[must_use]
    pub fn predicates(&self) -> &[FilterPredicate] {
        &self.predicates
    }

    /// Whether nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
