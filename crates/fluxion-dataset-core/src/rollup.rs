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

//! Monthly energy rollup.
//!
//! Power samples are summed per calendar month and multiplied by the
//! sampling interval in hours, turning kW into kWh (and W/m² into Wh/m²).

use chrono::Datelike;

use crate::errors::{DatasetError, DatasetResult};
use crate::table::MeasurementTable;

/// Totals for one calendar month, in the order of [`MonthlyRollup::columns`]
#[derive(Debug, Clone, PartialEq)]
pub struct RollupRow {
    pub year: i32,
    pub month: u32,
    /// `None` when the column had no populated cell that month
    pub totals: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRollup {
    columns: Vec<String>,
    rows: Vec<RollupRow>,
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl MonthlyRollup {
    /// Group the table by calendar month in the timeline's reference timezone.
    /// Produces one row per month the timeline touches.
    pub fn from_table(table: &MeasurementTable, columns: &[String]) -> DatasetResult<Self> {
        let sources = columns
            .iter()
            .map(|name| {
                table
                    .column(name)
                    .ok_or_else(|| DatasetError::UnknownColumn(name.clone()))
            })
            .collect::<DatasetResult<Vec<_>>>()?;

        let timeline = table.timeline();
        let scale = timeline.step_hours();
        let mut rows = Vec::new();
        let mut current: Option<(i32, u32)> = None;
        let mut acc: Vec<Accumulator> = Vec::new();

        let flush = |key: (i32, u32), acc: &[Accumulator], rows: &mut Vec<RollupRow>| {
            rows.push(RollupRow {
                year: key.0,
                month: key.1,
                totals: acc
                    .iter()
                    .map(|a| (a.count > 0).then(|| a.sum * scale))
                    .collect(),
            });
        };

        for row in 0..timeline.len() {
            let Some(local) = timeline.local(row) else {
                continue;
            };
            let key = (local.year(), local.month());
            if current != Some(key) {
                if let Some(previous) = current {
                    flush(previous, &acc, &mut rows);
                }
                current = Some(key);
                acc = sources.iter().map(|_| Accumulator::default()).collect();
            }
            for (column, slot) in sources.iter().zip(acc.iter_mut()) {
                if let Some(value) = column.get(row) {
                    slot.sum += value;
                    slot.count += 1;
                }
            }
        }
        if let Some(last) = current {
            flush(last, &acc, &mut rows);
        }

        Ok(Self {
            columns: columns.to_vec(),
            rows,
        })
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[RollupRow] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, year: i32, month: u32) -> Option<&RollupRow> {
        self.rows
            .iter()
            .find(|r| r.year == year && r.month == month)
    }

    /// Total of one column for one month
    #[must_use]
    pub fn total(&self, year: i32, month: u32, column: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.row(year, month)?.totals.get(idx).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::{MergePolicy, Provenance, SourceSeries, merge_series};
    use crate::timeline::Timeline;
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use chrono_tz::Tz;

    fn utc(m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, m, d, h, min, 0).unwrap()
    }

    fn power_series(column: &str, start: DateTime<Utc>, samples: usize, value: f64) -> SourceSeries {
        let mut series = SourceSeries::new(
            column,
            Provenance::Inverter {
                inverter: 1,
                metric: "Active power(kW)".to_owned(),
            },
        );
        for i in 0..samples {
            series.push(start + TimeDelta::minutes(5 * i64::try_from(i).unwrap()), Some(value));
        }
        series
    }

    #[test]
    fn test_constant_power_for_one_hour() {
        let timeline =
            Timeline::new(utc(9, 1, 0, 0), utc(9, 1, 23, 55), TimeDelta::minutes(5), Tz::UTC)
                .unwrap();
        let series = power_series("p", utc(9, 1, 10, 0), 12, 10.0);
        let (table, _) =
            merge_series(MeasurementTable::new(timeline), &[series], MergePolicy::default())
                .unwrap();

        let rollup = MonthlyRollup::from_table(&table, &["p".to_owned()]).unwrap();
        assert_eq!(rollup.rows().len(), 1);
        let total = rollup.total(2025, 9, "p").unwrap();
        assert!((total - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_one_row_per_month_and_missing_totals() {
        let timeline =
            Timeline::new(utc(8, 31, 23, 0), utc(10, 1, 1, 0), TimeDelta::minutes(5), Tz::UTC)
                .unwrap();
        let p = power_series("p", utc(9, 15, 12, 0), 24, 6.0);
        let (table, _) = merge_series(
            MeasurementTable::new(timeline),
            &[p, SourceSeries::new("empty", Provenance::Archive {
                station: "06072".to_owned(),
                parameter: "radia_glob".to_owned(),
            })],
            MergePolicy::default(),
        )
        .unwrap();

        let rollup =
            MonthlyRollup::from_table(&table, &["p".to_owned(), "empty".to_owned()]).unwrap();
        let keys: Vec<_> = rollup.rows().iter().map(|r| (r.year, r.month)).collect();
        assert_eq!(keys, vec![(2025, 8), (2025, 9), (2025, 10)]);

        assert_eq!(rollup.total(2025, 8, "p"), None);
        assert!((rollup.total(2025, 9, "p").unwrap() - 12.0).abs() < 1e-9);
        assert_eq!(rollup.total(2025, 9, "empty"), None);
    }

    #[test]
    fn test_groups_by_reference_timezone() {
        // 22:00 UTC on Aug 31 is already September in CEST
        let timeline = Timeline::new(
            utc(8, 31, 21, 0),
            utc(8, 31, 22, 55),
            TimeDelta::minutes(5),
            chrono_tz::CET,
        )
        .unwrap();
        let p = power_series("p", utc(8, 31, 21, 0), 24, 1.0);
        let (table, _) =
            merge_series(MeasurementTable::new(timeline), &[p], MergePolicy::default()).unwrap();

        let rollup = MonthlyRollup::from_table(&table, &["p".to_owned()]).unwrap();
        assert!((rollup.total(2025, 8, "p").unwrap() - 1.0).abs() < 1e-9);
        assert!((rollup.total(2025, 9, "p").unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_column() {
        let timeline =
            Timeline::new(utc(9, 1, 0, 0), utc(9, 1, 1, 0), TimeDelta::minutes(5), Tz::UTC)
                .unwrap();
        let result =
            MonthlyRollup::from_table(&MeasurementTable::new(timeline), &["nope".to_owned()]);
        assert!(matches!(result, Err(DatasetError::UnknownColumn(_))));
    }
}
