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

use chrono::{NaiveDate, Timelike};
use fluxion_dataset_core::MeasurementTable;

/// Hourly snapshot of a table with every column scaled to `[0, 1]`.
///
/// Cells stay `None` where the table is missing, so an absent value is never
/// confused with a zero reading.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletenessMatrix {
    columns: Vec<String>,
    /// Calendar date of every row, in the timeline's zone
    dates: Vec<NaiveDate>,
    /// One vector per column, one entry per row
    cells: Vec<Vec<Option<f64>>>,
}

impl CompletenessMatrix {
    /// Take the rows falling on a full hour and normalize each column by its
    /// largest absolute value among those rows.
    #[must_use]
    pub fn hourly(table: &MeasurementTable) -> Self {
        let timeline = table.timeline();
        let mut rows = Vec::new();
        let mut dates = Vec::new();
        for index in 0..timeline.len() {
            if let Some(local) = timeline.local(index)
                && local.minute() == 0
                && local.second() == 0
            {
                rows.push(index);
                dates.push(local.date_naive());
            }
        }

        let cells = table
            .columns()
            .iter()
            .map(|column| {
                let raw: Vec<Option<f64>> = rows.iter().map(|&r| column.get(r)).collect();
                normalize(&raw)
            })
            .collect();

        Self {
            columns: table.column_names().map(str::to_owned).collect(),
            dates,
            cells,
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    #[must_use]
    pub fn column(&self, index: usize) -> Option<&[Option<f64>]> {
        self.cells.get(index).map(Vec::as_slice)
    }

    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<f64> {
        self.cells.get(column)?.get(row).copied().flatten()
    }
}

fn normalize(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let max = values
        .iter()
        .flatten()
        .map(|v| v.abs())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));

    values
        .iter()
        .map(|value| {
            let v = value.as_ref()?.abs();
            Some(max.filter(|m| *m > 0.0).map_or(0.0, |m| v / m))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};
    use fluxion_dataset_core::{MergePolicy, Provenance, SourceSeries, Timeline, merge_series};

    fn table(values: &[(&str, u32, f64)]) -> MeasurementTable {
        let timeline = Timeline::new(
            Utc.with_ymd_and_hms(2025, 9, 1, 22, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 9, 2, 1, 55, 0).unwrap(),
            TimeDelta::minutes(5),
            chrono_tz::UTC,
        )
        .unwrap();
        let mut table = MeasurementTable::new(timeline);
        table.ensure_column("empty");

        let mut series = Vec::new();
        for &(column, minutes, value) in values {
            let mut s = SourceSeries::new(
                column,
                Provenance::Archive {
                    station: "test".to_owned(),
                    parameter: column.to_owned(),
                },
            );
            let t = Utc.with_ymd_and_hms(2025, 9, 1, 22, 0, 0).unwrap()
                + TimeDelta::minutes(i64::from(minutes));
            s.push(t, Some(value));
            series.push(s);
        }
        merge_series(table, &series, MergePolicy::default()).unwrap().0
    }

    #[test]
    fn test_hourly_rows_and_dates() {
        let matrix = CompletenessMatrix::hourly(&table(&[]));
        assert_eq!(matrix.row_count(), 4);
        assert_eq!(matrix.dates()[0], NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
        assert_eq!(matrix.dates()[3], NaiveDate::from_ymd_opt(2025, 9, 2).unwrap());
        assert_eq!(matrix.columns(), &["empty".to_owned()]);
    }

    #[test]
    fn test_normalization_by_abs_max() {
        let matrix = CompletenessMatrix::hourly(&table(&[
            ("power", 0, -2.0),
            ("power", 60, 4.0),
            ("power", 65, 100.0),
            ("zero", 0, 0.0),
        ]));
        assert_eq!(matrix.columns(), &["empty", "power", "zero"]);

        // 65 minutes is not on the hour and does not count towards the maximum
        assert_eq!(matrix.cell(0, 1), Some(0.5));
        assert_eq!(matrix.cell(1, 1), Some(1.0));
        assert_eq!(matrix.cell(2, 1), None);

        assert_eq!(matrix.cell(0, 2), Some(0.0));
        assert_eq!(matrix.cell(1, 2), None);
    }

    #[test]
    fn test_missing_column_stays_missing() {
        let matrix = CompletenessMatrix::hourly(&table(&[("power", 0, 1.0)]));
        assert!(matrix.column(0).unwrap().iter().all(Option::is_none));
    }

    #[test]
    fn test_rows_follow_local_hours() {
        // Kolkata is UTC+05:30, so UTC half hours are local full hours
        let timeline = Timeline::new(
            Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 9, 1, 2, 55, 0).unwrap(),
            TimeDelta::minutes(5),
            chrono_tz::Asia::Kolkata,
        )
        .unwrap();
        let matrix = CompletenessMatrix::hourly(&MeasurementTable::new(timeline));
        assert_eq!(matrix.row_count(), 3);
    }
}
