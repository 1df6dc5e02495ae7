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

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader, Xlsx, open_workbook};

use crate::errors::{SourceError, SourceResult};

/// Access to spreadsheet sheets by file path.
/// Lets the pipeline run against real `.xlsx` files or against sheets built in memory.
pub trait WorkbookSource {
    /// Whether a workbook exists at `path`
    fn available(&self, path: &Path) -> bool;

    /// Load one sheet of the workbook at `path`
    fn sheet(&self, path: &Path, sheet: &str) -> SourceResult<Range<Data>>;
}

/// Reads `.xlsx` workbooks from disk
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxWorkbooks;

impl WorkbookSource for XlsxWorkbooks {
    fn available(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn sheet(&self, path: &Path, sheet: &str) -> SourceResult<Range<Data>> {
        let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| SourceError::Workbook {
            path: path.to_path_buf(),
            message: format!("{e}"),
        })?;

        if !workbook.sheet_names().iter().any(|name| name == sheet) {
            return Err(SourceError::MissingSheet {
                path: path.to_path_buf(),
                sheet: sheet.to_owned(),
            });
        }

        workbook
            .worksheet_range(sheet)
            .map_err(|e| SourceError::Workbook {
                path: path.to_path_buf(),
                message: format!("{e}"),
            })
    }
}

/// Sheets held in memory, keyed by workbook path and sheet name
#[derive(Debug, Default, Clone)]
pub struct MemoryWorkbooks {
    sheets: HashMap<(PathBuf, String), Range<Data>>,
}

impl MemoryWorkbooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, sheet: &str, range: Range<Data>) {
        self.sheets.insert((path.into(), sheet.to_owned()), range);
    }

    /// Insert a sheet given as rows of cells starting at A1
    pub fn insert_rows(&mut self, path: impl Into<PathBuf>, sheet: &str, rows: &[Vec<Data>]) {
        self.insert(path, sheet, range_from_rows(rows));
    }
}

impl WorkbookSource for MemoryWorkbooks {
    fn available(&self, path: &Path) -> bool {
        self.sheets.keys().any(|(p, _)| p == path)
    }

    fn sheet(&self, path: &Path, sheet: &str) -> SourceResult<Range<Data>> {
        if !self.available(path) {
            return Err(SourceError::Workbook {
                path: path.to_path_buf(),
                message: "no such workbook".to_owned(),
            });
        }
        self.sheets
            .get(&(path.to_path_buf(), sheet.to_owned()))
            .cloned()
            .ok_or_else(|| SourceError::MissingSheet {
                path: path.to_path_buf(),
                sheet: sheet.to_owned(),
            })
    }
}

/// Build a calamine range anchored at A1 from rows of cells.
/// Short rows are padded with empty cells.
#[must_use]
pub fn range_from_rows(rows: &[Vec<Data>]) -> Range<Data> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if rows.is_empty() || width == 0 {
        return Range::default();
    }

    let last_row = u32::try_from(rows.len() - 1).unwrap_or(u32::MAX);
    let last_col = u32::try_from(width - 1).unwrap_or(u32::MAX);
    let mut range = Range::new((0, 0), (last_row, last_col));
    for (r, row) in (0_u32..).zip(rows) {
        for (c, cell) in (0_u32..).zip(row) {
            range.set_value((r, c), cell.clone());
        }
    }
    range
}
