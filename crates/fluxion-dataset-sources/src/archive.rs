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

//! Reader for the national weather archive's daily NDJSON dumps.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use fluxion_dataset_core::{
    Alignment, AmbiguityPolicy, LocalizationAudit, MeasurementTable, MergePolicy, Provenance,
    SourceSeries, localize_series, merge_series,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::{SourceError, SourceResult};
use crate::report::SourceReport;

pub const GHI_COLUMN: &str = "GHI (W/m2)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSource {
    pub station_id: String,
    pub parameter_id: String,
    /// Zone used for `observed` values that carry no offset
    pub timezone: Tz,
    pub native_step: TimeDelta,
    /// Longest gap, in timeline steps, that interpolation may fill
    pub max_gap: Option<usize>,
    pub policy: MergePolicy,
}

#[derive(Debug, Default, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Properties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Properties {
    station_id: Option<String>,
    parameter_id: Option<String>,
    observed: Option<String>,
    value: Option<f64>,
}

/// Outcome of one line
#[derive(Debug, PartialEq)]
enum Line {
    Blank,
    Malformed,
    Unmatched,
    /// Matching record whose local `observed` value could not be placed in time
    Unresolvable,
    Observation(DateTime<Utc>, Option<f64>),
}

impl ArchiveSource {
    fn parse_line(&self, line: &[u8], audit: &mut LocalizationAudit) -> Line {
        if line.iter().all(u8::is_ascii_whitespace) {
            return Line::Blank;
        }
        let Ok(feature) = serde_json::from_slice::<Feature>(line) else {
            return Line::Malformed;
        };
        let props = feature.properties;
        if props.station_id.as_deref() != Some(self.station_id.as_str())
            || props.parameter_id.as_deref() != Some(self.parameter_id.as_str())
        {
            return Line::Unmatched;
        }
        let Some(observed) = props.observed else {
            return Line::Malformed;
        };

        if let Ok(t) = DateTime::parse_from_rfc3339(observed.trim()) {
            audit.unambiguous += 1;
            return Line::Observation(t.with_timezone(&Utc), props.value);
        }

        let Some(naive) = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(observed.trim(), fmt).ok())
        else {
            return Line::Malformed;
        };
        let outcome = localize_series(&[naive], self.timezone, AmbiguityPolicy::Strict)[0];
        audit.record(naive, outcome);
        match outcome.instant() {
            Some(t) => Line::Observation(t, props.value),
            None => Line::Unresolvable,
        }
    }

    fn read_day(&self, path: &Path, report: &mut SourceReport) -> SourceResult<SourceSeries> {
        let bytes = fs::read(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut series = SourceSeries::new(
            GHI_COLUMN,
            Provenance::Archive {
                station: self.station_id.clone(),
                parameter: self.parameter_id.clone(),
            },
        );
        let mut audit = LocalizationAudit::default();
        for line in bytes.split(|b| *b == b'\n') {
            match self.parse_line(line, &mut audit) {
                Line::Blank | Line::Unresolvable => {}
                Line::Malformed => report.malformed_lines += 1,
                Line::Unmatched => report.unmatched_lines += 1,
                Line::Observation(t, value) => series.push(t, value),
            }
        }
        report.localization.absorb(audit);
        debug!("{}: {} observations", path.display(), series.records.len());
        Ok(series)
    }
}

/// Merge the daily archive files into the table, then bring the coarse
/// samples onto the timeline grid.
///
/// Interpolation runs once, after the last day is merged, so gaps spanning
/// midnight are filled the same way as gaps inside a day.
pub fn merge_archive(
    mut table: MeasurementTable,
    source: &ArchiveSource,
    files: &[PathBuf],
) -> SourceResult<(MeasurementTable, SourceReport)> {
    let alignment =
        Alignment::for_native_step(source.native_step, table.timeline().step(), source.max_gap)?;
    let mut report = SourceReport::new("Archive");
    table.ensure_column(GHI_COLUMN);

    for path in files {
        info!("Retrieving {}", path.display());
        let series = source.read_day(path, &mut report)?;
        report.off_native_grid += series
            .records
            .iter()
            .filter(|r| !alignment.on_native_grid(r.timestamp))
            .count();
        let (merged, merge) = merge_series(table, &[series], source.policy)?;
        table = merged;
        report.merge.absorb(&merge);
        report.files += 1;
    }

    let (table, filled) = alignment.finish(table, &[GHI_COLUMN.to_owned()])?;
    report.merge.interpolated += filled;
    Ok((table, report))
}
