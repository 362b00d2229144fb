//! Call-volume overview: volume over time, the weekday/hour heatmap, and
//! per-beat and per-nature breakdowns.

use std::collections::BTreeMap;

use cfs_summary_models::{
    BeatResponseTime, BeatVolume, Call, CallVolumeDict, FilterPredicate, Granularity,
    HeatmapCell, MetricCell, NatureVolume, ReferenceTables, TimeSpan, VolumePoint,
};
use chrono::NaiveDateTime;

use crate::bucket::TimeBucketer;
use crate::query::{BoundedQuery, RecordSource};
use crate::{SummaryConfig, SummaryError};

/// Aggregates a snapshot of calls for the dashboard.
///
/// Empty time buckets are omitted from every series; only occupied buckets
/// are reported.
#[derive(Debug, Clone)]
pub struct CallVolumeOverview<'a> {
    query: BoundedQuery<Call>,
    references: &'a ReferenceTables,
    granularity: Option<Granularity>,
}

impl<'a> CallVolumeOverview<'a> {
    /// Builds the overview from an existing snapshot.
    ///
    /// # Errors
    ///
    /// * [`SummaryError::Config`] if the configured thresholds are invalid
    /// * [`SummaryError::UnknownReference`] if a call names a beat or nature
    ///   missing from `references`
    pub fn new(
        query: BoundedQuery<Call>,
        references: &'a ReferenceTables,
        config: &SummaryConfig,
    ) -> Result<Self, SummaryError> {
        let bucketer = TimeBucketer::new(config.thresholds)?;

        for call in query.filtered_records() {
            if let Some(beat) = call.beat
                && !references.beats.contains_key(&beat)
            {
                log::warn!("Call {} references unknown beat {beat}", call.call_id);
                return Err(SummaryError::UnknownReference {
                    table: "beat",
                    id: beat,
                });
            }
            if let Some(nature) = call.nature
                && !references.natures.contains_key(&nature)
            {
                log::warn!("Call {} references unknown nature {nature}", call.call_id);
                return Err(SummaryError::UnknownReference {
                    table: "nature",
                    id: nature,
                });
            }
        }

        let granularity = query.bounds().map(|span| bucketer.granularity_for(span));

        Ok(Self {
            query,
            references,
            granularity,
        })
    }

    /// Fetches the calls matching `predicates` and builds the overview.
    ///
    /// # Errors
    ///
    /// Returns any error from [`BoundedQuery::new`] or [`Self::new`].
    pub fn from_source<S: RecordSource<Call> + ?Sized>(
        source: &S,
        predicates: Vec<FilterPredicate>,
        references: &'a ReferenceTables,
        config: &SummaryConfig,
    ) -> Result<Self, SummaryError> {
        Self::new(BoundedQuery::new(source, predicates)?, references, config)
    }

    /// Observed bounds of the snapshot.
    #[must_use]
    pub const fn bounds(&self) -> Option<&TimeSpan> {
        self.query.bounds()
    }

    /// Granularity chosen for the snapshot's span.
    #[must_use]
    pub const fn granularity(&self) -> Option<Granularity> {
        self.granularity
    }

    /// Calls per occupied bucket, ordered by bucket start.
    #[must_use]
    pub fn volume_by_date(&self) -> Vec<VolumePoint> {
        let Some(granularity) = self.granularity else {
            return Vec::new();
        };

        let mut counts: BTreeMap<NaiveDateTime, u64> = BTreeMap::new();
        for call in self.query.filtered_records() {
            *counts
                .entry(TimeBucketer::truncate(call.time_received, granularity))
                .or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|(date, volume)| VolumePoint { date, volume })
            .collect()
    }

    /// Calls per (weekday, hour) slot, normalized by how many times that
    /// weekday occurs in the span. Slots with no calls are omitted.
    #[must_use]
    pub fn day_hour_heatmap(&self) -> Vec<HeatmapCell> {
        let Some(span) = self.query.bounds() else {
            return Vec::new();
        };
        if !span.is_day_aligned() {
            log::debug!(
                "day_hour_heatmap: span {} -> {} is not day-aligned; counting every date it touches",
                span.min_time,
                span.max_time
            );
        }

        let occurrences = span.weekday_occurrences();
        let mut totals: BTreeMap<(u8, u8), u64> = BTreeMap::new();
        for call in self.query.filtered_records() {
            *totals
                .entry((call.dow_received, call.hour_received))
                .or_insert(0) += 1;
        }

        totals
            .into_iter()
            .map(|((dow_received, hour_received), total)| {
                let freq = occurrences
                    .get(usize::from(dow_received))
                    .copied()
                    .unwrap_or(0);
                let cell = MetricCell::new(total, freq);
                HeatmapCell {
                    dow_received,
                    hour_received,
                    total,
                    freq,
                    volume: cell.avg_volume,
                }
            })
            .collect()
    }

    /// Calls per beat, ordered by beat id. Calls without a beat are skipped.
    #[must_use]
    pub fn volume_by_beat(&self) -> Vec<BeatVolume> {
        let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
        for beat in self.query.filtered_records().iter().filter_map(|c| c.beat) {
            *counts.entry(beat).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .filter_map(|(beat_id, volume)| {
                let beat = self.references.beats.get(&beat_id)?;
                Some(BeatVolume {
                    beat_id,
                    beat: beat.descr.clone(),
                    volume,
                })
            })
            .collect()
    }

    /// Calls per nature, busiest first. Calls without a nature are skipped.
    #[must_use]
    pub fn volume_by_nature(&self) -> Vec<NatureVolume> {
        let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
        for nature in self.query.filtered_records().iter().filter_map(|c| c.nature) {
            *counts.entry(nature).or_insert(0) += 1;
        }

        let mut volumes: Vec<NatureVolume> = counts
            .into_iter()
            .filter_map(|(nature_id, volume)| {
                let nature = self.references.natures.get(&nature_id)?;
                Some(NatureVolume {
                    nature_id,
                    nature: nature.descr.clone(),
                    volume,
                })
            })
            .collect();
        volumes.sort_by(|a, b| {
            b.volume
                .cmp(&a.volume)
                .then_with(|| a.nature_id.cmp(&b.nature_id))
        });
        volumes
    }

    /// Mean officer response time per beat, over calls that record one.
    #[must_use]
    pub fn response_time_by_beat(&self) -> Vec<BeatResponseTime> {
        let mut sums: BTreeMap<i64, (u64, u64)> = BTreeMap::new();
        for call in self.query.filtered_records() {
            if let (Some(beat), Some(secs)) = (call.beat, call.officer_response_secs) {
                let entry = sums.entry(beat).or_insert((0, 0));
                entry.0 += secs;
                entry.1 += 1;
            }
        }

        sums.into_iter()
            .filter_map(|(beat_id, (total_secs, count))| {
                let beat = self.references.beats.get(&beat_id)?;
                Some(BeatResponseTime {
                    beat_id,
                    beat: beat.descr.clone(),
                    mean_response_secs: MetricCell::new(total_secs, count).avg_volume,
                })
            })
            .collect()
    }

    /// Every series under its transport key.
    #[must_use]
    pub fn to_dict(&self) -> CallVolumeDict {
        CallVolumeDict {
            bucket: self.granularity,
            volume_by_date: self.volume_by_date(),
            day_hour_heatmap: self.day_hour_heatmap(),
            volume_by_beat: self.volume_by_beat(),
            volume_by_nature: self.volume_by_nature(),
            response_time_by_beat: self.response_time_by_beat(),
        }
    }
}
