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

use std::path::PathBuf;

use chrono_tz::Tz;
use fluxion_dataset_core::{
    AmbiguityPolicy, LocalizationAudit, MeasurementTable, MergePolicy, Provenance, SourceSeries,
    merge_series,
};
use tracing::info;

use crate::errors::SourceResult;
use crate::report::SourceReport;
use crate::sheet::{CellNumber, SheetLayout, SheetTable, localize_rows};
use crate::workbook::WorkbookSource;

/// One inverter's monthly exports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InverterSource {
    pub id: u32,
    /// Zone of the wall-clock timestamps in the export
    pub timezone: Tz,
    pub layout: SheetLayout,
    /// Number of PV strings, each with a current and a voltage channel
    pub strings: u32,
    pub ambiguity: AmbiguityPolicy,
    pub policy: MergePolicy,
}

/// `(sheet header, table column)` pairs read from an inverter export
#[must_use]
pub fn inverter_columns(id: u32, strings: u32) -> Vec<(String, String)> {
    let mut columns = vec![
        (
            "Total input power(kW)".to_owned(),
            format!("Inverter {id} Total input power (kW)"),
        ),
        (
            "Active power(kW)".to_owned(),
            format!("Inverter {id} Total output power (kW)"),
        ),
    ];
    for s in 1..=strings {
        columns.push((
            format!("PV{s} input current(A)"),
            format!("Inverter {id} PV{s} input current(A)"),
        ));
        columns.push((
            format!("PV{s} input voltage(V)"),
            format!("Inverter {id} PV{s} input voltage(V)"),
        ));
    }
    columns
}

/// Merge every monthly export of one inverter into the table.
///
/// A file missing any expected column is a schema error and aborts the merge.
pub fn merge_inverter(
    mut table: MeasurementTable,
    source: &InverterSource,
    files: &[PathBuf],
    workbooks: &dyn WorkbookSource,
) -> SourceResult<(MeasurementTable, SourceReport)> {
    let mut report = SourceReport::new(format!("Inverter {}", source.id));
    let columns = inverter_columns(source.id, source.strings);

    for path in files {
        info!("Retrieving {}", path.display());
        let range = workbooks.sheet(path, &source.layout.sheet)?;
        let sheet = SheetTable::new(path, &range, &source.layout)?;

        let positions = columns
            .iter()
            .map(|(header, _)| sheet.column(header))
            .collect::<SourceResult<Vec<u32>>>()?;

        let mut rows = Vec::new();
        for row in sheet.data_rows() {
            match sheet.timestamp(row)? {
                Some(local) => rows.push((row, local)),
                None => report.skipped_rows += 1,
            }
        }

        let mut audit = LocalizationAudit::default();
        let resolved = localize_rows(path, &rows, source.timezone, source.ambiguity, &mut audit);
        report.localization.absorb(audit);

        let mut series: Vec<SourceSeries> = columns
            .iter()
            .map(|(header, column)| {
                SourceSeries::new(
                    column.clone(),
                    Provenance::Inverter {
                        inverter: source.id,
                        metric: header.clone(),
                    },
                )
            })
            .collect();

        for &(row, timestamp) in &resolved {
            for (s, &col) in series.iter_mut().zip(&positions) {
                let value = sheet.number(row, col);
                if value == CellNumber::Invalid {
                    report.invalid_values += 1;
                }
                s.push(timestamp, value.value());
            }
        }

        let (merged, merge) = merge_series(table, &series, source.policy)?;
        table = merged;
        report.merge.absorb(&merge);
        report.files += 1;
    }

    Ok((table, report))
}
