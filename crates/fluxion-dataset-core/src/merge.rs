// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Projection of source series onto the measurement table.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{DatasetError, DatasetResult};
use crate::table::MeasurementTable;
use crate::timeline::Slot;

/// Which logger and channel a series came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    Inverter { inverter: u32, metric: String },
    WeatherSensor { object: String, metric: String },
    Archive { station: String, parameter: String },
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inverter { inverter, metric } => write!(f, "inverter {inverter} / {metric}"),
            Self::WeatherSensor { object, metric } => write!(f, "{object} / {metric}"),
            Self::Archive { station, parameter } => write!(f, "station {station} / {parameter}"),
        }
    }
}

/// A single observation already converted to UTC
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRecord {
    pub timestamp: DateTime<Utc>,
    /// `None` when the logger left the cell empty
    pub value: Option<f64>,
}

/// Observations bound for one table column
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSeries {
    pub column: String,
    pub provenance: Provenance,
    pub records: Vec<SourceRecord>,
}

impl SourceSeries {
    #[must_use]
    pub fn new(column: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            column: column.into(),
            provenance,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, timestamp: DateTime<Utc>, value: Option<f64>) {
        self.records.push(SourceRecord { timestamp, value });
    }
}

/// What to do when a cell already holds a different value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Abort the merge
    Reject,
    /// Last writer wins; every overwrite is counted and logged
    #[default]
    Overwrite,
    /// First writer wins
    KeepExisting,
}

/// What to do with a source timestamp outside the timeline range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfRangePolicy {
    Reject,
    /// Drop the row; counted and logged
    #[default]
    Skip,
}

/// Policies every merge call has to state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergePolicy {
    pub conflict: ConflictPolicy,
    pub out_of_range: OutOfRangePolicy,
}

/// How a source's native sampling relates to the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Native step equals the timeline step; every timestamp must be a timeline slot
    Exact,
    /// Native step is a coarser multiple; samples land on every n-th slot and
    /// the gaps are filled by linear interpolation once the source is loaded
    Interpolated {
        native_step: TimeDelta,
        /// Longest run of missing cells that is still filled
        max_gap: Option<usize>,
    },
}

impl Alignment {
    /// Pick the alignment strategy for a source sampled every `native` on a
    /// timeline stepping by `canonical`.
    pub fn for_native_step(
        native: TimeDelta,
        canonical: TimeDelta,
        max_gap: Option<usize>,
    ) -> DatasetResult<Self> {
        let native_ms = native.num_milliseconds();
        let canonical_ms = canonical.num_milliseconds();
        if native_ms <= 0 || canonical_ms <= 0 || native_ms.rem_euclid(canonical_ms) != 0 {
            return Err(DatasetError::IncompatibleStep {
                native_minutes: native.num_minutes(),
                canonical_minutes: canonical.num_minutes(),
            });
        }
        if native_ms == canonical_ms {
            Ok(Self::Exact)
        } else {
            Ok(Self::Interpolated {
                native_step: native,
                max_gap,
            })
        }
    }

    /// Whether `timestamp` lies on the source's own sampling grid, counted
    /// from the Unix epoch. Always true for exact sources.
    #[must_use]
    pub fn on_native_grid(&self, timestamp: DateTime<Utc>) -> bool {
        match self {
            Self::Exact => true,
            Self::Interpolated { native_step, .. } => {
                let step_ms = native_step.num_milliseconds();
                step_ms > 0 && timestamp.timestamp_millis().rem_euclid(step_ms) == 0
            }
        }
    }

    /// Post-processing after every file of a source has been merged.
    /// Returns the number of cells filled.
    pub fn finish(
        self,
        mut table: MeasurementTable,
        columns: &[String],
    ) -> DatasetResult<(MeasurementTable, usize)> {
        let Self::Interpolated { max_gap, .. } = self else {
            return Ok((table, 0));
        };

        let mut filled = 0;
        for column in columns {
            let (next, count) = interpolate_linear(table, column, max_gap)?;
            table = next;
            filled += count;
        }
        Ok((table, filled))
    }
}

/// Counters for one or more merge calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Cells that were empty and received a value
    pub written: usize,
    /// Writes that repeated the value already present
    pub unchanged: usize,
    /// Conflicts resolved by overwriting
    pub overwritten: usize,
    /// Conflicts resolved by keeping the existing value
    pub kept_existing: usize,
    /// Rows dropped because they fall outside the timeline
    pub out_of_range: usize,
    /// Rows carrying no value
    pub missing_values: usize,
    /// Cells filled by interpolation
    pub interpolated: usize,
}

impl MergeReport {
    pub fn absorb(&mut self, other: &Self) {
        self.written += other.written;
        self.unchanged += other.unchanged;
        self.overwritten += other.overwritten;
        self.kept_existing += other.kept_existing;
        self.out_of_range += other.out_of_range;
        self.missing_values += other.missing_values;
        self.interpolated += other.interpolated;
    }
}

/// Write every series into the table by exact timestamp match.
///
/// Columns are declared even when a series carries no usable record, so the
/// table's column set does not depend on data availability.
pub fn merge_series(
    mut table: MeasurementTable,
    series: &[SourceSeries],
    policy: MergePolicy,
) -> DatasetResult<(MeasurementTable, MergeReport)> {
    let mut report = MergeReport::default();
    let step_minutes = table.timeline().step().num_minutes();

    for s in series {
        let column = table.ensure_column(&s.column);
        for record in &s.records {
            let row = match table.timeline().locate(record.timestamp) {
                Slot::At(row) => row,
                Slot::OffGrid => {
                    return Err(DatasetError::OffGrid {
                        column: s.column.clone(),
                        timestamp: record.timestamp,
                        step_minutes,
                    });
                }
                Slot::OutOfRange => match policy.out_of_range {
                    OutOfRangePolicy::Reject => {
                        return Err(DatasetError::OutOfRange {
                            column: s.column.clone(),
                            timestamp: record.timestamp,
                        });
                    }
                    OutOfRangePolicy::Skip => {
                        report.out_of_range += 1;
                        continue;
                    }
                },
            };

            let Some(incoming) = record.value else {
                report.missing_values += 1;
                continue;
            };

            let cell = &mut table.values_mut(column)[row];
            match *cell {
                None => {
                    *cell = Some(incoming);
                    report.written += 1;
                }
                Some(existing) if existing.total_cmp(&incoming).is_eq() => {
                    report.unchanged += 1;
                }
                Some(existing) => match policy.conflict {
                    ConflictPolicy::Reject => {
                        return Err(DatasetError::Conflict {
                            column: s.column.clone(),
                            timestamp: record.timestamp,
                            existing,
                            incoming,
                        });
                    }
                    ConflictPolicy::Overwrite => {
                        debug!(
                            "Overwriting {} at {}: {} -> {} ({})",
                            s.column, record.timestamp, existing, incoming, s.provenance
                        );
                        *cell = Some(incoming);
                        report.overwritten += 1;
                    }
                    ConflictPolicy::KeepExisting => {
                        report.kept_existing += 1;
                    }
                },
            }
        }
    }

    if report.overwritten > 0 {
        warn!("{} cells overwritten by later writes", report.overwritten);
    }
    if report.out_of_range > 0 {
        warn!(
            "{} rows outside the timeline {} .. {} were skipped",
            report.out_of_range,
            table.timeline().start(),
            table.timeline().end()
        );
    }

    Ok((table, report))
}

/// Fill interior gaps of a column by linear interpolation between the
/// bounding known values. Leading and trailing gaps are left missing, as is
/// any gap longer than `max_gap` cells. Returns the number of filled cells.
///
/// Running it twice changes nothing the second time.
pub fn interpolate_linear(
    mut table: MeasurementTable,
    column: &str,
    max_gap: Option<usize>,
) -> DatasetResult<(MeasurementTable, usize)> {
    let idx = table
        .column_index(column)
        .ok_or_else(|| DatasetError::UnknownColumn(column.to_owned()))?;
    let values = table.values_mut(idx);

    let mut filled = 0;
    let mut previous: Option<(usize, f64)> = None;
    for row in 0..values.len() {
        let Some(value) = values[row] else {
            continue;
        };
        if let Some((start, start_value)) = previous {
            let gap = row - start - 1;
            if gap > 0 && max_gap.is_none_or(|limit| gap <= limit) {
                #[expect(
                    clippy::cast_precision_loss,
                    reason = "gap lengths are far below 2^52"
                )]
                let span = (gap + 1) as f64;
                for k in 1..=gap {
                    #[expect(
                        clippy::cast_precision_loss,
                        reason = "gap lengths are far below 2^52"
                    )]
                    let fraction = k as f64 / span;
                    values[start + k] = Some(start_value + (value - start_value) * fraction);
                }
                filled += gap;
            }
        }
        previous = Some((row, value));
    }

    Ok((table, filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::Timeline;
    use chrono::TimeZone;
    use chrono_tz::Tz;

    fn t(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, h, m, 0).unwrap()
    }

    fn table() -> MeasurementTable {
        let timeline = Timeline::new(t(0, 0), t(1, 0), TimeDelta::minutes(5), Tz::UTC).unwrap();
        MeasurementTable::new(timeline)
    }

    fn series(column: &str, points: &[(DateTime<Utc>, Option<f64>)]) -> SourceSeries {
        let mut s = SourceSeries::new(
            column,
            Provenance::Inverter {
                inverter: 1,
                metric: column.to_owned(),
            },
        );
        for (ts, v) in points {
            s.push(*ts, *v);
        }
        s
    }

    #[test]
    fn test_exact_merge_writes_cells() {
        let input = series("p", &[(t(0, 0), Some(1.0)), (t(0, 5), Some(2.0)), (t(0, 10), None)]);
        let (table, report) = merge_series(table(), &[input], MergePolicy::default()).unwrap();

        assert_eq!(table.get("p", 0), Some(1.0));
        assert_eq!(table.get("p", 1), Some(2.0));
        assert_eq!(table.get("p", 2), None);
        assert_eq!(report.written, 2);
        assert_eq!(report.missing_values, 1);
    }

    #[test]
    fn test_empty_series_still_declares_column() {
        let (table, _) =
            merge_series(table(), &[series("p", &[])], MergePolicy::default()).unwrap();
        assert!(table.has_column("p"));
        assert_eq!(table.column("p").unwrap().missing(), 13);
    }

    #[test]
    fn test_off_grid_is_an_error() {
        let input = series("p", &[(t(0, 7), Some(1.0))]);
        let result = merge_series(table(), &[input], MergePolicy::default());
        assert!(matches!(result, Err(DatasetError::OffGrid { .. })));
    }

    #[test]
    fn test_out_of_range_policies() {
        let input = series("p", &[(t(2, 0), Some(1.0)), (t(0, 0), Some(3.0))]);

        let (table_after, report) =
            merge_series(table(), std::slice::from_ref(&input), MergePolicy::default()).unwrap();
        assert_eq!(report.out_of_range, 1);
        assert_eq!(table_after.get("p", 0), Some(3.0));

        let strict = MergePolicy {
            out_of_range: OutOfRangePolicy::Reject,
            ..MergePolicy::default()
        };
        let result = merge_series(table(), &[input], strict);
        assert!(matches!(result, Err(DatasetError::OutOfRange { .. })));
    }

    #[test]
    fn test_conflict_policies() {
        let first = series("p", &[(t(0, 0), Some(1.0)), (t(0, 5), Some(5.0))]);
        let second = series("p", &[(t(0, 0), Some(2.0)), (t(0, 5), Some(5.0))]);

        let (base, _) = merge_series(table(), &[first], MergePolicy::default()).unwrap();

        let (overwritten, report) = merge_series(
            base.clone(),
            std::slice::from_ref(&second),
            MergePolicy::default(),
        )
        .unwrap();
        assert_eq!(overwritten.get("p", 0), Some(2.0));
        assert_eq!(report.overwritten, 1);
        assert_eq!(report.unchanged, 1);

        let keep = MergePolicy {
            conflict: ConflictPolicy::KeepExisting,
            ..MergePolicy::default()
        };
        let (kept, report) =
            merge_series(base.clone(), std::slice::from_ref(&second), keep).unwrap();
        assert_eq!(kept.get("p", 0), Some(1.0));
        assert_eq!(report.kept_existing, 1);

        let reject = MergePolicy {
            conflict: ConflictPolicy::Reject,
            ..MergePolicy::default()
        };
        let result = merge_series(base, &[second], reject);
        assert!(matches!(result, Err(DatasetError::Conflict { .. })));
    }

    #[test]
    fn test_interpolation_fills_interior_only() {
        let input = series(
            "ghi",
            &[(t(0, 10), Some(10.0)), (t(0, 20), Some(30.0)), (t(0, 40), Some(10.0))],
        );
        let (table, _) = merge_series(table(), &[input], MergePolicy::default()).unwrap();
        let (table, filled) = interpolate_linear(table, "ghi", None).unwrap();

        assert_eq!(filled, 4);
        assert_eq!(table.get("ghi", 0), None);
        assert_eq!(table.get("ghi", 1), None);
        assert_eq!(table.get("ghi", 2), Some(10.0));
        assert_eq!(table.get("ghi", 3), Some(20.0));
        assert_eq!(table.get("ghi", 4), Some(30.0));
        assert_eq!(table.get("ghi", 5), Some(25.0));
        assert_eq!(table.get("ghi", 6), Some(20.0));
        assert_eq!(table.get("ghi", 7), Some(15.0));
        assert_eq!(table.get("ghi", 8), Some(10.0));
        assert_eq!(table.get("ghi", 9), None);
        assert_eq!(table.get("ghi", 12), None);
    }

    #[test]
    fn test_interpolation_is_idempotent() {
        let input = series("ghi", &[(t(0, 0), Some(0.0)), (t(0, 30), Some(3.0))]);
        let (table, _) = merge_series(table(), &[input], MergePolicy::default()).unwrap();
        let (once, filled) = interpolate_linear(table, "ghi", None).unwrap();
        assert_eq!(filled, 5);

        let snapshot = once.column("ghi").unwrap().clone();
        let (twice, filled_again) = interpolate_linear(once, "ghi", None).unwrap();
        assert_eq!(filled_again, 0);
        assert_eq!(twice.column("ghi").unwrap(), &snapshot);
    }

    #[test]
    fn test_interpolation_respects_max_gap() {
        let input = series(
            "ghi",
            &[(t(0, 0), Some(0.0)), (t(0, 10), Some(2.0)), (t(0, 40), Some(8.0))],
        );
        let (table, _) = merge_series(table(), &[input], MergePolicy::default()).unwrap();
        let (table, filled) = interpolate_linear(table, "ghi", Some(1)).unwrap();

        assert_eq!(filled, 1);
        assert_eq!(table.get("ghi", 1), Some(1.0));
        assert!((3..8).all(|row| table.get("ghi", row).is_none()));
    }

    #[test]
    fn test_interpolation_unknown_column() {
        let result = interpolate_linear(table(), "nope", None);
        assert!(matches!(result, Err(DatasetError::UnknownColumn(_))));
    }

    #[test]
    fn test_alignment_selection() {
        let five = TimeDelta::minutes(5);
        assert_eq!(
            Alignment::for_native_step(five, five, None).unwrap(),
            Alignment::Exact
        );
        assert!(matches!(
            Alignment::for_native_step(TimeDelta::minutes(10), five, None).unwrap(),
            Alignment::Interpolated { .. }
        ));
        assert!(Alignment::for_native_step(TimeDelta::minutes(7), five, None).is_err());
        assert!(Alignment::for_native_step(TimeDelta::minutes(1), five, None).is_err());
    }

    #[test]
    fn test_alignment_finish_interpolates_coarse_source() {
        let input = series("ghi", &[(t(0, 0), Some(100.0)), (t(0, 10), Some(200.0))]);
        let (table, _) = merge_series(table(), &[input], MergePolicy::default()).unwrap();

        let alignment =
            Alignment::for_native_step(TimeDelta::minutes(10), TimeDelta::minutes(5), None)
                .unwrap();
        let (table, filled) = alignment.finish(table, &["ghi".to_owned()]).unwrap();
        assert_eq!(filled, 1);
        assert_eq!(table.get("ghi", 1), Some(150.0));

        let (table, filled) = Alignment::Exact
            .finish(table, &["ghi".to_owned()])
            .unwrap();
        assert_eq!(filled, 0);
        assert_eq!(table.get("ghi", 1), Some(150.0));
    }

    #[test]
    fn test_native_grid() {
        let coarse =
            Alignment::for_native_step(TimeDelta::minutes(10), TimeDelta::minutes(5), None)
                .unwrap();
        assert!(coarse.on_native_grid(t(0, 10)));
        assert!(!coarse.on_native_grid(t(0, 15)));
        assert!(Alignment::Exact.on_native_grid(t(0, 15)));
    }
}
