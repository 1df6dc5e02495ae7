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

//! CSV persistence for the measurement table and the monthly rollup.
//!
//! Files are written to a sibling temp file first and renamed into place,
//! so a checkpoint is never left half written.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::errors::{DatasetError, DatasetResult};
use crate::rollup::MonthlyRollup;
use crate::table::MeasurementTable;
use crate::timeline::{Slot, Timeline};

pub const TIMESTAMP_HEADER: &str = "timestamp";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> DatasetError + '_ {
    move |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_error(path: &Path) -> impl FnOnce(csv::Error) -> DatasetError + '_ {
    move |source| DatasetError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

fn format_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_atomically(
    path: &Path,
    write: impl FnOnce(&mut csv::Writer<fs::File>) -> DatasetResult<()>,
) -> DatasetResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }

    let temp_path: PathBuf = path.with_extension("csv.tmp");
    {
        let mut writer = csv::Writer::from_path(&temp_path).map_err(csv_error(&temp_path))?;
        write(&mut writer)?;
        writer.flush().map_err(io_error(&temp_path))?;
    }
    fs::rename(&temp_path, path).map_err(io_error(path))
}

/// Write the full table, one row per timeline slot
pub fn write_table(table: &MeasurementTable, path: &Path) -> DatasetResult<()> {
    let timeline = table.timeline();
    write_atomically(path, |writer| {
        let header = std::iter::once(TIMESTAMP_HEADER).chain(table.column_names());
        writer.write_record(header).map_err(csv_error(path))?;

        for row in 0..timeline.len() {
            let Some(local) = timeline.local(row) else {
                continue;
            };
            let record = std::iter::once(local.format(TIMESTAMP_FORMAT).to_string())
                .chain(table.columns().iter().map(|c| format_value(c.get(row))));
            writer.write_record(record).map_err(csv_error(path))?;
        }
        Ok(())
    })
}

/// Read a table written by [`write_table`] back onto `timeline`
pub fn read_table(path: &Path, timeline: Timeline) -> DatasetResult<MeasurementTable> {
    let malformed = |message: String| DatasetError::MalformedTable {
        path: path.to_path_buf(),
        message,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_error(path))?;
    let headers = reader.headers().map_err(csv_error(path))?.clone();
    if headers.get(0) != Some(TIMESTAMP_HEADER) {
        return Err(malformed(format!(
            "first column must be '{TIMESTAMP_HEADER}'"
        )));
    }

    let mut table = MeasurementTable::new(timeline);
    let columns: Vec<usize> = headers
        .iter()
        .skip(1)
        .map(|name| table.ensure_column(name))
        .collect();

    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error(path))?;
        let raw_ts = record.get(0).unwrap_or_default();
        let timestamp = DateTime::parse_from_str(raw_ts, TIMESTAMP_FORMAT)
            .map_err(|e| malformed(format!("row {}: bad timestamp '{raw_ts}': {e}", line + 1)))?
            .with_timezone(&Utc);

        let Slot::At(row) = table.timeline().locate(timestamp) else {
            return Err(malformed(format!(
                "row {}: {timestamp} is not on the timeline",
                line + 1
            )));
        };

        for (&column, raw) in columns.iter().zip(record.iter().skip(1)) {
            if raw.is_empty() {
                continue;
            }
            let value: f64 = raw.parse().map_err(|e| {
                malformed(format!("row {}: bad value '{raw}': {e}", line + 1))
            })?;
            table.values_mut(column)[row] = Some(value);
        }
    }

    Ok(table)
}

/// Write the monthly rollup as `year,month,<columns...>`
pub fn write_rollup(rollup: &MonthlyRollup, path: &Path) -> DatasetResult<()> {
    write_atomically(path, |writer| {
        let header = ["year", "month"]
            .into_iter()
            .chain(rollup.columns().iter().map(String::as_str));
        writer.write_record(header).map_err(csv_error(path))?;

        for row in rollup.rows() {
            let record = [row.year.to_string(), row.month.to_string()]
                .into_iter()
                .chain(row.totals.iter().map(|v| format_value(*v)));
            writer.write_record(record).map_err(csv_error(path))?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::{MergePolicy, Provenance, SourceSeries, interpolate_linear, merge_series};
    use chrono::{TimeDelta, TimeZone};
    use chrono_tz::Tz;

    fn timeline() -> Timeline {
        Timeline::new(
            Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 9, 1, 1, 0, 0).unwrap(),
            TimeDelta::minutes(5),
            Tz::UTC,
        )
        .unwrap()
    }

    fn populated_table() -> MeasurementTable {
        let start = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
        let mut power = SourceSeries::new(
            "Inverter 1 Total output power (kW)",
            Provenance::Inverter {
                inverter: 1,
                metric: "Active power(kW)".to_owned(),
            },
        );
        power.push(start, Some(1.25));
        power.push(start + TimeDelta::minutes(5), Some(-0.1));

        let mut ghi = SourceSeries::new(
            "GHI (W/m2)",
            Provenance::Archive {
                station: "06072".to_owned(),
                parameter: "radia_glob".to_owned(),
            },
        );
        ghi.push(start, Some(100.0));
        ghi.push(start + TimeDelta::minutes(15), Some(200.0));

        let (table, _) = merge_series(
            MeasurementTable::new(timeline()),
            &[power, ghi],
            MergePolicy::default(),
        )
        .unwrap();
        let (table, _) = interpolate_linear(table, "GHI (W/m2)", None).unwrap();
        table
    }

    #[test]
    fn test_round_trip_preserves_values_and_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resources").join("clean_data.csv");
        let table = populated_table();

        write_table(&table, &path).unwrap();
        let restored = read_table(&path, timeline()).unwrap();

        assert_eq!(
            restored.column_names().collect::<Vec<_>>(),
            table.column_names().collect::<Vec<_>>()
        );
        for (original, read_back) in table.columns().iter().zip(restored.columns()) {
            assert_eq!(original, read_back);
        }

        // Interpolated cells lie on the line between their bounding samples
        let ghi = restored.column("GHI (W/m2)").unwrap();
        assert!((ghi.get(1).unwrap() - 100.0 - 100.0 / 3.0).abs() < 1e-9);
        assert!((ghi.get(2).unwrap() - 100.0 - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(ghi.get(4), None);
    }

    #[test]
    fn test_written_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean_data.csv");
        write_table(&populated_table(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "timestamp,Inverter 1 Total output power (kW),GHI (W/m2)"
        );
        assert_eq!(lines.next().unwrap(), "2025-09-01 00:00:00+00:00,1.25,100");
        assert_eq!(content.lines().count(), 14);
        assert!(!path.with_extension("csv.tmp").exists());
    }

    #[test]
    fn test_read_rejects_off_timeline_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "timestamp,a\n2025-09-01 00:02:00+00:00,1\n").unwrap();

        let result = read_table(&path, timeline());
        assert!(matches!(result, Err(DatasetError::MalformedTable { .. })));
    }

    #[test]
    fn test_write_rollup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean_data_monthly.csv");
        let table = populated_table();
        let rollup = MonthlyRollup::from_table(
            &table,
            &[
                "Inverter 1 Total output power (kW)".to_owned(),
                "GHI (W/m2)".to_owned(),
            ],
        )
        .unwrap();

        write_rollup(&rollup, &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(
            lines[0],
            "year,month,Inverter 1 Total output power (kW),GHI (W/m2)"
        );
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("2025,9,"));
    }
}
