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

//! Cell-level access to logger export sheets.
//!
//! Positions are absolute: row 0 / column 0 is cell A1 regardless of where
//! calamine decides the used range starts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use calamine::{Data, Range};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use fluxion_dataset_core::{AmbiguityPolicy, LocalizationAudit, Localized, localize_series};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{SourceError, SourceResult};

const DEFAULT_SHEET: &str = "5 minutes";

/// Where the header and the timestamp column sit in an export sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    pub sheet: String,
    /// Zero-based row holding the column names; data starts on the next row
    pub header_row: u32,
    /// Zero-based column holding the local timestamp
    pub timestamp_column: u32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            sheet: DEFAULT_SHEET.to_owned(),
            header_row: 3,
            timestamp_column: 3,
        }
    }
}

/// Parsed value of a numeric cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum CellNumber {
    Value(f64),
    Empty,
    /// Text or error cell that is not a number
    Invalid,
}

impl CellNumber {
    pub(crate) fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::Empty | Self::Invalid => None,
        }
    }
}

/// A sheet with its header row resolved
#[derive(Debug)]
pub(crate) struct SheetTable<'a> {
    path: PathBuf,
    range: &'a Range<Data>,
    layout: &'a SheetLayout,
    headers: HashMap<String, u32>,
    last_row: u32,
}

impl<'a> SheetTable<'a> {
    pub(crate) fn new(
        path: &Path,
        range: &'a Range<Data>,
        layout: &'a SheetLayout,
    ) -> SourceResult<Self> {
        let missing_header = || SourceError::MissingHeader {
            path: path.to_path_buf(),
            row: layout.header_row,
        };

        let (last_row, last_col) = range.end().ok_or_else(missing_header)?;
        if layout.header_row > last_row {
            return Err(missing_header());
        }

        let first_col = range.start().map_or(0, |(_, c)| c);
        let mut headers = HashMap::new();
        for col in first_col..=last_col {
            if let Some(name) = range.get_value((layout.header_row, col)).and_then(cell_text) {
                headers.entry(name).or_insert(col);
            }
        }
        if headers.is_empty() {
            return Err(missing_header());
        }

        Ok(Self {
            path: path.to_path_buf(),
            range,
            layout,
            headers,
            last_row,
        })
    }

    /// Column index of a header name
    pub(crate) fn column(&self, name: &str) -> SourceResult<u32> {
        self.headers
            .get(name)
            .copied()
            .ok_or_else(|| SourceError::MissingColumn {
                path: self.path.clone(),
                column: name.to_owned(),
            })
    }

    /// Row indices below the header
    pub(crate) fn data_rows(&self) -> std::ops::RangeInclusive<u32> {
        (self.layout.header_row + 1)..=self.last_row
    }

    pub(crate) fn cell(&self, row: u32, col: u32) -> &Data {
        self.range.get_value((row, col)).unwrap_or(&Data::Empty)
    }

    pub(crate) fn text(&self, row: u32, col: u32) -> Option<String> {
        cell_text(self.cell(row, col))
    }

    pub(crate) fn number(&self, row: u32, col: u32) -> CellNumber {
        cell_number(self.cell(row, col))
    }

    /// Local timestamp of a row; `None` for rows with an empty timestamp cell
    pub(crate) fn timestamp(&self, row: u32) -> SourceResult<Option<NaiveDateTime>> {
        let cell = self.cell(row, self.layout.timestamp_column);
        if cell_text(cell).is_none() {
            return Ok(None);
        }
        cell_datetime(cell)
            .map(Some)
            .ok_or_else(|| SourceError::Timestamp {
                path: self.path.clone(),
                row,
                value: cell.to_string(),
            })
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty => return None,
        Data::String(s) => s.trim().to_owned(),
        Data::Int(_)
        | Data::Float(_)
        | Data::Bool(_)
        | Data::DateTime(_)
        | Data::DateTimeIso(_)
        | Data::DurationIso(_)
        | Data::Error(_) => cell.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

pub(crate) fn cell_number(cell: &Data) -> CellNumber {
    match cell {
        Data::Empty => CellNumber::Empty,
        #[expect(
            clippy::cast_precision_loss,
            reason = "logger readings are far below 2^52"
        )]
        Data::Int(v) => CellNumber::Value(*v as f64),
        Data::Float(v) if v.is_finite() => CellNumber::Value(*v),
        Data::Float(_) => CellNumber::Empty,
        Data::String(s) => {
            let s = s.trim();
            if s.is_empty() || s == "-" || s == "--" {
                CellNumber::Empty
            } else {
                s.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map_or(CellNumber::Invalid, CellNumber::Value)
            }
        }
        Data::Bool(_)
        | Data::DateTime(_)
        | Data::DateTimeIso(_)
        | Data::DurationIso(_)
        | Data::Error(_) => CellNumber::Invalid,
    }
}

const TEXT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Interpret a cell as a naive wall-clock timestamp
pub(crate) fn cell_datetime(cell: &Data) -> Option<NaiveDateTime> {
    match cell {
        Data::DateTime(dt) => excel_serial(dt.as_f64()),
        Data::Float(serial) => excel_serial(*serial),
        #[expect(
            clippy::cast_precision_loss,
            reason = "serial day numbers are small"
        )]
        Data::Int(serial) => excel_serial(*serial as f64),
        Data::String(s) | Data::DateTimeIso(s) => {
            let s = s.trim();
            TEXT_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        }
        Data::Bool(_) | Data::DurationIso(_) | Data::Error(_) | Data::Empty => None,
    }
}

/// Serial day of 9999-12-31
const MAX_SERIAL: f64 = 2_958_466.0;

/// Convert an Excel serial date (days since 1899-12-30) to a timestamp,
/// rounded to the second.
pub(crate) fn excel_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..MAX_SERIAL).contains(&serial) {
        return None;
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "bounded by MAX_SERIAL above"
    )]
    let seconds = (serial * 86_400.0).round() as i64;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    epoch.checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

/// Localize `(row, local time)` pairs given in sheet order.
/// Unresolvable times are dropped, recorded in `audit` and logged.
pub(crate) fn localize_rows(
    path: &Path,
    rows: &[(u32, NaiveDateTime)],
    tz: Tz,
    policy: AmbiguityPolicy,
    audit: &mut LocalizationAudit,
) -> Vec<(u32, DateTime<Utc>)> {
    let locals: Vec<NaiveDateTime> = rows.iter().map(|(_, t)| *t).collect();
    let outcomes = localize_series(&locals, tz, policy);

    let mut resolved = Vec::with_capacity(rows.len());
    for (&(row, local), outcome) in rows.iter().zip(outcomes) {
        audit.record(local, outcome);
        match outcome {
            Localized::Unambiguous(t) | Localized::Inferred(t) => resolved.push((row, t)),
            Localized::Unresolvable(reason) => {
                warn!(
                    "{}: row {} local time {} in {} is unresolvable ({:?}), skipped",
                    path.display(),
                    row + 1,
                    local,
                    tz,
                    reason
                );
            }
        }
    }
    resolved
}
