//! Officer-activity overview: how units split their time across activity
//! states at each time of day, and how often they are on duty per beat and
//! district.

use std::collections::{BTreeMap, BTreeSet};

use cfs_summary_models::{
    ActivityType, AllocationOverTime, Beat, BeatOnDuty, District, DistrictOnDuty,
    FilterPredicate, MetricCell, OfficerActivity, OfficerActivityDict, RecordError,
    ReferenceTables, TimeSpan,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::query::{BoundedQuery, RecordSource};
use crate::{SummaryConfig, SummaryError};

/// An activity with its type and geography resolved.
#[derive(Debug, Clone, Copy)]
struct PlacedActivity<'a> {
    time: NaiveDateTime,
    kind: ActivityType,
    beat: &'a Beat,
    district: &'a District,
}

/// Running tally for one geography.
#[derive(Debug)]
struct DutyTally<'a, G> {
    geography: &'a G,
    on_duty: u64,
    baseline: u64,
}

impl<'a, G> DutyTally<'a, G> {
    const fn new(geography: &'a G) -> Self {
        Self {
            geography,
            on_duty: 0,
            baseline: 0,
        }
    }

    fn rate(&self) -> f64 {
        MetricCell::new(self.on_duty, self.baseline).avg_volume
    }
}

/// Aggregates a snapshot of officer activities for the dashboard.
#[derive(Debug, Clone)]
pub struct OfficerActivityOverview<'a> {
    query: BoundedQuery<OfficerActivity>,
    placed: Vec<PlacedActivity<'a>>,
    bin_seconds: u32,
}

impl<'a> OfficerActivityOverview<'a> {
    /// Builds the overview from an existing snapshot, resolving every
    /// activity's type and geography up front.
    ///
    /// # Errors
    ///
    /// * [`SummaryError::Config`] if `config` is invalid
    /// * [`SummaryError::UnknownReference`] if an activity names an activity
    ///   type, call unit, beat, or district missing from `references`
    pub fn new(
        query: BoundedQuery<OfficerActivity>,
        references: &'a ReferenceTables,
        config: &SummaryConfig,
    ) -> Result<Self, SummaryError> {
        config.validate()?;

        let placed = query
            .filtered_records()
            .iter()
            .map(|activity| place(activity, references))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            query,
            placed,
            bin_seconds: config.allocation_bin_minutes * 60,
        })
    }

    /// Fetches the activities matching `predicates` and builds the overview.
    ///
    /// # Errors
    ///
    /// Returns any error from [`BoundedQuery::new`] or [`Self::new`].
    pub fn from_source<S: RecordSource<OfficerActivity> + ?Sized>(
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

    fn time_bin(&self, time: NaiveDateTime) -> NaiveTime {
        let secs = time.num_seconds_from_midnight();
        NaiveTime::from_num_seconds_from_midnight_opt(secs - secs % self.bin_seconds, 0)
            .unwrap_or(NaiveTime::MIN)
    }

    /// Activity counts per time-of-day bin and activity type.
    ///
    /// Every activity type appears under every bin, zero-filled. `freq` for a
    /// bin is the number of distinct dates with at least one on-duty record
    /// in that bin, shared by every type in the bin.
    #[must_use]
    pub fn allocation_over_time(&self) -> AllocationOverTime {
        let mut totals: BTreeMap<NaiveTime, BTreeMap<ActivityType, u64>> = BTreeMap::new();
        let mut on_duty_dates: BTreeMap<NaiveTime, BTreeSet<NaiveDate>> = BTreeMap::new();

        for activity in &self.placed {
            let bin = self.time_bin(activity.time);
            *totals
                .entry(bin)
                .or_default()
                .entry(activity.kind)
                .or_insert(0) += 1;
            if activity.kind.is_on_duty() {
                on_duty_dates
                    .entry(bin)
                    .or_default()
                    .insert(activity.time.date());
            }
        }

        totals
            .into_iter()
            .map(|(bin, counts)| {
                let freq = on_duty_dates
                    .get(&bin)
                    .map_or(0, |dates| u64::try_from(dates.len()).unwrap_or(u64::MAX));
                let cells = ActivityType::all()
                    .iter()
                    .map(|kind| {
                        let total = counts.get(kind).copied().unwrap_or(0);
                        (kind.to_string(), MetricCell::new(total, freq))
                    })
                    .collect();
                (bin.format("%H:%M:%S").to_string(), cells)
            })
            .collect()
    }

    fn tally_by<G>(
        &self,
        geography: impl Fn(&PlacedActivity<'a>) -> (i64, &'a G),
    ) -> BTreeMap<i64, DutyTally<'a, G>> {
        let mut tallies: BTreeMap<i64, DutyTally<'a, G>> = BTreeMap::new();
        for activity in self
            .placed
            .iter()
            .filter(|a| a.kind.is_staffing_baseline())
        {
            let (id, place) = geography(activity);
            let tally = tallies.entry(id).or_insert_with(|| DutyTally::new(place));
            tally.baseline += 1;
            if activity.kind.is_on_duty() {
                tally.on_duty += 1;
            }
        }
        tallies
    }

    /// On-duty share of staffing-baseline records per beat, ordered by beat
    /// id. Beats with no baseline records are omitted.
    #[must_use]
    pub fn on_duty_by_beat(&self) -> Vec<BeatOnDuty> {
        self.tally_by(|a| (a.beat.beat_id, a.beat))
            .into_iter()
            .map(|(beat_id, tally)| BeatOnDuty {
                beat_id,
                beat: tally.geography.descr.clone(),
                on_duty: tally.rate(),
            })
            .collect()
    }

    /// On-duty share of staffing-baseline records per district, ordered by
    /// district id. Districts with no baseline records are omitted.
    #[must_use]
    pub fn on_duty_by_district(&self) -> Vec<DistrictOnDuty> {
        self.tally_by(|a| (a.district.district_id, a.district))
            .into_iter()
            .map(|(district_id, tally)| DistrictOnDuty {
                district_id,
                district: tally.geography.descr.clone(),
                on_duty: tally.rate(),
            })
            .collect()
    }

    /// Every series under its transport key.
    #[must_use]
    pub fn to_dict(&self) -> OfficerActivityDict {
        OfficerActivityDict {
            allocation_over_time: self.allocation_over_time(),
            on_duty_by_beat: self.on_duty_by_beat(),
            on_duty_by_district: self.on_duty_by_district(),
        }
    }
}

fn place<'a>(
    activity: &OfficerActivity,
    references: &'a ReferenceTables,
) -> Result<PlacedActivity<'a>, SummaryError> {
    let kind = references
        .activity_types
        .resolve(activity.activity_type)
        .ok_or_else(|| {
            log::warn!(
                "Officer activity {} has unknown activity type {}",
                activity.officer_activity_id,
                activity.activity_type
            );
            SummaryError::UnknownReference {
                table: "officer_activity_type",
                id: activity.activity_type,
            }
        })?;

    let (beat, district) = references
        .placement(activity.call_unit)
        .map_err(|e| {
            log::warn!(
                "Officer activity {} has unplaceable call unit {}: {e}",
                activity.officer_activity_id,
                activity.call_unit
            );
            match e {
                RecordError::UnknownReference { table, id } => {
                    SummaryError::UnknownReference { table, id }
                }
                other => SummaryError::Record(other),
            }
        })?;

    Ok(PlacedActivity {
        time: activity.time,
        kind,
        beat,
        district,
    })
}

#[cfg(test)]
mod tests {
    use cfs_summary_models::FilterField;

    use super::*;
    use crate::fixtures::{activities, references, ts};

    fn overview_since<'a>(
        records: &[OfficerActivity],
        references: &'a ReferenceTables,
        since: &str,
    ) -> OfficerActivityOverview<'a> {
        OfficerActivityOverview::from_source(
            records,
            vec![FilterPredicate::gte(FilterField::Time, ts(since))],
            references,
            &SummaryConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn allocation_lists_every_activity_type() {
        let records = activities();
        let refs = references();
        let overview =
            OfficerActivityOverview::from_source(&records, Vec::new(), &refs, &SummaryConfig::default())
                .unwrap();

        let allocation = overview.to_dict().allocation_over_time;
        assert!(!allocation.is_empty());

        let names: BTreeSet<&str> = allocation
            .values()
            .flat_map(|by_type| by_type.keys().map(String::as_str))
            .collect();
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec![
                "IN CALL - CITIZEN INITIATED",
                "IN CALL - DIRECTED PATROL",
                "IN CALL - SELF INITIATED",
                "ON DUTY",
                "OUT OF SERVICE",
                "PATROL",
            ]
        );
        for by_type in allocation.values() {
            assert_eq!(by_type.len(), ActivityType::all().len());
        }
    }

    #[test]
    fn no_activity_yields_empty_series() {
        let records = activities();
        let refs = references();
        let overview = overview_since(&records, &refs, "2015-01-01T00:00");

        let dict = overview.to_dict();
        assert!(dict.allocation_over_time.is_empty());
        assert!(dict.on_duty_by_beat.is_empty());
        assert!(dict.on_duty_by_district.is_empty());
        assert!(overview.bounds().is_none());
    }

    #[test]
    fn one_busy_and_one_on_duty_record() {
        let records = activities();
        let refs = references();
        let overview = overview_since(&records, &refs, "2014-01-17T00:00");

        let allocation = overview.allocation_over_time();
        assert_eq!(allocation.keys().collect::<Vec<_>>(), vec!["09:00:00"]);

        let cells = &allocation["09:00:00"];
        assert_eq!(cells.len(), 6);
        for (name, cell) in cells {
            assert_eq!(cell.freq, 1, "{name}");
            if name == "OUT OF SERVICE" || name == "ON DUTY" {
                assert_eq!(cell.total, 1, "{name}");
                assert!((cell.avg_volume - 1.0).abs() < f64::EPSILON, "{name}");
            } else {
                assert_eq!(cell.total, 0, "{name}");
                assert!(cell.avg_volume.abs() < f64::EPSILON, "{name}");
            }
        }

        assert_eq!(
            overview.on_duty_by_beat(),
            vec![BeatOnDuty {
                beat_id: 2,
                beat: "2".to_string(),
                on_duty: 1.0,
            }]
        );
        assert_eq!(
            overview.on_duty_by_district(),
            vec![DistrictOnDuty {
                district_id: 2,
                district: "B".to_string(),
                on_duty: 1.0,
            }]
        );
    }

    #[test]
    fn totals_per_type_match_raw_counts() {
        let records = activities();
        let refs = references();
        let overview =
            OfficerActivityOverview::from_source(&records, Vec::new(), &refs, &SummaryConfig::default())
                .unwrap();

        let allocation = overview.allocation_over_time();
        for kind in ActivityType::all() {
            let summed: u64 = allocation
                .values()
                .map(|by_type| by_type[&kind.to_string()].total)
                .sum();
            let raw = records
                .iter()
                .filter(|a| refs.activity_types.resolve(a.activity_type) == Some(*kind))
                .count() as u64;
            assert_eq!(summed, raw, "{kind}");
        }
    }

    #[test]
    fn freq_counts_dates_with_on_duty_records() {
        let records = activities();
        let refs = references();
        let overview =
            OfficerActivityOverview::from_source(&records, Vec::new(), &refs, &SummaryConfig::default())
                .unwrap();

        let allocation = overview.allocation_over_time();
        // On-duty at 09:00 on the 15th and the 18th.
        let nine = &allocation["09:00:00"];
        assert_eq!(nine["ON DUTY"].total, 2);
        assert_eq!(nine["ON DUTY"].freq, 2);
        assert_eq!(nine["IN CALL - CITIZEN INITIATED"].total, 1);
        assert!((nine["IN CALL - CITIZEN INITIATED"].avg_volume - 0.5).abs() < f64::EPSILON);

        for cells in allocation.values() {
            for cell in cells.values() {
                if cell.freq == 0 {
                    assert!(cell.avg_volume.abs() < f64::EPSILON);
                } else {
                    #[allow(clippy::cast_precision_loss)]
                    let expected = cell.total as f64 / cell.freq as f64;
                    assert!((cell.avg_volume - expected).abs() < f64::EPSILON);
                }
            }
        }
    }

    #[test]
    fn busy_bin_without_on_duty_has_zero_average() {
        let records = vec![OfficerActivity::new(1, 1, ts("2014-01-15T09:00"), 1)];
        let refs = references();
        let overview =
            OfficerActivityOverview::from_source(&records, Vec::new(), &refs, &SummaryConfig::default())
                .unwrap();

        let cell = overview.allocation_over_time()["09:00:00"]["IN CALL - CITIZEN INITIATED"];
        assert_eq!(cell.total, 1);
        assert_eq!(cell.freq, 0);
        assert!(cell.avg_volume.abs() < f64::EPSILON);
    }

    #[test]
    fn wider_bins_merge_clock_times() {
        let records = activities();
        let refs = references();
        let config = SummaryConfig {
            allocation_bin_minutes: 60,
            ..SummaryConfig::default()
        };
        let overview =
            OfficerActivityOverview::from_source(&records, Vec::new(), &refs, &config).unwrap();

        let allocation = overview.allocation_over_time();
        assert_eq!(
            allocation.keys().collect::<Vec<_>>(),
            vec!["09:00:00", "10:00:00"]
        );
        // 09:00, 09:10, 09:50 on the 15th and 16th, 09:00 on the 18th.
        assert_eq!(allocation["09:00:00"]["ON DUTY"].total, 4);
        assert_eq!(allocation["09:00:00"]["ON DUTY"].freq, 3);
    }

    #[test]
    fn on_duty_rate_excludes_out_of_service() {
        let records = activities();
        let refs = references();
        let overview =
            OfficerActivityOverview::from_source(&records, Vec::new(), &refs, &SummaryConfig::default())
                .unwrap();

        // Beat 1: two in-call and three on-duty records; one out-of-service.
        // Beat 2: two in-call and three on-duty records; one out-of-service.
        let beats = overview.on_duty_by_beat();
        assert_eq!(beats.len(), 2);
        for beat in &beats {
            assert!((beat.on_duty - 0.6).abs() < f64::EPSILON, "{beat:?}");
        }

        let districts = overview.on_duty_by_district();
        assert_eq!(
            districts.iter().map(|d| d.district.as_str()).collect::<Vec<_>>(),
            vec!["A", "B"]
        );
    }

    #[test]
    fn geography_with_only_out_of_service_is_omitted() {
        let records = vec![OfficerActivity::new(1, 2, ts("2014-01-16T10:10"), 1)];
        let refs = references();
        let overview =
            OfficerActivityOverview::from_source(&records, Vec::new(), &refs, &SummaryConfig::default())
                .unwrap();

        assert!(overview.on_duty_by_beat().is_empty());
        assert!(overview.on_duty_by_district().is_empty());
        assert_eq!(overview.allocation_over_time().len(), 1);
    }

    #[test]
    fn unknown_references_fail_construction() {
        let refs = references();

        let records = vec![OfficerActivity::new(1, 6, ts("2014-01-15T09:00"), 1)];
        let err =
            OfficerActivityOverview::from_source(&records, Vec::new(), &refs, &SummaryConfig::default())
                .unwrap_err();
        assert!(matches!(
            err,
            SummaryError::UnknownReference {
                table: "officer_activity_type",
                id: 6
            }
        ));

        let records = vec![OfficerActivity::new(1, 3, ts("2014-01-15T09:00"), 42)];
        let err =
            OfficerActivityOverview::from_source(&records, Vec::new(), &refs, &SummaryConfig::default())
                .unwrap_err();
        assert!(matches!(
            err,
            SummaryError::UnknownReference {
                table: "call_unit",
                id: 42
            }
        ));
    }

    #[test]
    fn call_unit_with_unknown_beat_names_the_beat() {
        let refs = references().with_call_unit(3, "C3", 9, 1);
        let records = vec![OfficerActivity::new(1, 3, ts("2014-01-15T09:00"), 3)];
        let err =
            OfficerActivityOverview::from_source(&records, Vec::new(), &refs, &SummaryConfig::default())
                .unwrap_err();
        assert!(matches!(
            err,
            SummaryError::UnknownReference {
                table: "beat",
                id: 9
            }
        ));
    }

    #[test]
    fn district_rate_spans_every_beat_in_it() {
        let refs = references()
            .with_beat(3, "3")
            .with_call_unit(3, "A3", 3, 1);
        let records = vec![
            OfficerActivity::new(1, 1, ts("2014-01-15T09:00"), 1),
            OfficerActivity::new(2, 3, ts("2014-01-15T09:00"), 1),
            OfficerActivity::new(3, 3, ts("2014-01-15T09:00"), 3),
        ];
        let overview =
            OfficerActivityOverview::from_source(&records, Vec::new(), &refs, &SummaryConfig::default())
                .unwrap();

        let beats: Vec<_> = overview
            .on_duty_by_beat()
            .into_iter()
            .map(|b| (b.beat_id, b.beat, b.on_duty))
            .collect();
        assert_eq!(
            beats,
            vec![(1, "1".to_string(), 0.5), (3, "3".to_string(), 1.0)]
        );

        let districts = overview.on_duty_by_district();
        assert_eq!(districts.len(), 1);
        assert_eq!(districts[0].district, "A");
        assert!((districts[0].on_duty - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn repeated_calls_agree() {
        let records = activities();
        let refs = references();
        let overview = overview_since(&records, &refs, "2014-01-16T00:00");
        assert_eq!(overview.to_dict(), overview.to_dict());
    }

    #[test]
    fn dict_serializes_time_keys_as_strings() {
        let records = activities();
        let refs = references();
        let overview = overview_since(&records, &refs, "2014-01-17T00:00");

        let value = serde_json::to_value(overview.to_dict()).unwrap();
        let cell = &value["allocation_over_time"]["09:00:00"]["ON DUTY"];
        assert_eq!(cell["total"], 1);
        assert_eq!(cell["freq"], 1);
        assert_eq!(cell["avg_volume"], 1.0);
        assert_eq!(value["on_duty_by_beat"][0]["beat_id"], 2);
        assert_eq!(value["on_duty_by_district"][0]["district"], "B");
    }
}
