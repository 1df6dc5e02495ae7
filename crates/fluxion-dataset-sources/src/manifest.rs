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

//! Explicit list of the files a run is going to read.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::errors::{MissingFile, SourceError, SourceResult};
use crate::workbook::WorkbookSource;

/// Period covered by one source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Period {
    Month { year: i32, month: u32 },
    Day(NaiveDate),
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Month { year, month } => write!(f, "{year:04}-{month:02}"),
            Self::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl Period {
    /// Calendar months overlapping `[start, end]`
    #[must_use]
    pub fn months(start: NaiveDateTime, end: NaiveDateTime) -> Vec<Self> {
        let mut periods = Vec::new();
        let (mut year, mut month) = (start.year(), start.month());
        let last = (end.year(), end.month());
        while (year, month) <= last {
            periods.push(Self::Month { year, month });
            if month == 12 {
                year += 1;
                month = 1;
            } else {
                month += 1;
            }
        }
        periods
    }

    /// Calendar days from `start`'s date to `end`'s date
    #[must_use]
    pub fn days(start: NaiveDateTime, end: NaiveDateTime) -> Vec<Self> {
        start
            .date()
            .iter_days()
            .take_while(|d| *d <= end.date())
            .map(Self::Day)
            .collect()
    }
}

/// Which reader a file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Inverter(u32),
    WeatherStation,
    Archive,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inverter(id) => write!(f, "Inverter {id}"),
            Self::WeatherStation => write!(f, "Weather station"),
            Self::Archive => write!(f, "Archive"),
        }
    }
}

impl SourceKind {
    /// Periods of the files covering `[start, end]`: months for the
    /// spreadsheet loggers, days for the archive
    #[must_use]
    pub fn periods(self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<Period> {
        if self.is_spreadsheet() {
            Period::months(start, end)
        } else {
            Period::days(start, end)
        }
    }

    /// File name relative to the source's data directory, `None` when the
    /// source does not publish files for that kind of period
    #[must_use]
    pub fn file_name(self, period: Period) -> Option<PathBuf> {
        match (self, period) {
            (Self::Inverter(id), Period::Month { year, month }) => Some(PathBuf::from(format!(
                "Inverter_{id}_{year:04}_{month:02}.xlsx"
            ))),
            (Self::WeatherStation, Period::Month { year, month }) => {
                Some(PathBuf::from(format!("EMI_{year:04}_{month:02}.xlsx")))
            }
            (Self::Archive, Period::Day(date)) => Some(
                PathBuf::from(date.format("%Y").to_string())
                    .join(format!("{}.txt", date.format("%Y-%m-%d"))),
            ),
            (Self::Inverter(_) | Self::WeatherStation, Period::Day(_))
            | (Self::Archive, Period::Month { .. }) => None,
        }
    }

    fn is_spreadsheet(self) -> bool {
        !matches!(self, Self::Archive)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub source: SourceKind,
    pub period: Period,
    pub path: PathBuf,
}

/// Every `(source, period, path)` the readers will open, in read order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: SourceKind, period: Period, data_dir: &Path) -> SourceResult<()> {
        let name = source
            .file_name(period)
            .ok_or_else(|| SourceError::PeriodMismatch {
                kind: source.to_string(),
                period: period.to_string(),
            })?;
        self.entries.push(ManifestEntry {
            source,
            period,
            path: data_dir.join(name),
        });
        Ok(())
    }

    /// Every file of `source` covering `[start, end]`
    pub fn add_range(
        &mut self,
        source: SourceKind,
        data_dir: &Path,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> SourceResult<()> {
        for period in source.periods(start, end) {
            self.push(source, period, data_dir)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paths of one source, in read order
    #[must_use]
    pub fn files(&self, source: SourceKind) -> Vec<PathBuf> {
        self.entries
            .iter()
            .filter(|e| e.source == source)
            .map(|e| e.path.clone())
            .collect()
    }

    /// Check that every file exists before anything is read.
    /// All missing files are reported together.
    pub fn validate(&self, workbooks: &dyn WorkbookSource) -> SourceResult<()> {
        let missing: Vec<MissingFile> = self
            .entries
            .iter()
            .filter(|e| {
                if e.source.is_spreadsheet() {
                    !workbooks.available(&e.path)
                } else {
                    !e.path.is_file()
                }
            })
            .map(|e| MissingFile {
                source: e.source.to_string(),
                period: e.period.to_string(),
                path: e.path.clone(),
            })
            .collect();

        if missing.is_empty() {
            debug!("All {} manifest entries available", self.entries.len());
            Ok(())
        } else {
            Err(SourceError::Unavailable(missing))
        }
    }
}
