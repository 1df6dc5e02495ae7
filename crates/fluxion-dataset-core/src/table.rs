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

use chrono::{DateTime, Utc};

use crate::timeline::{Slot, Timeline};

/// One named measurement series aligned to the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Option<f64>>,
}

impl Column {
    fn empty(name: &str, len: usize) -> Self {
        Self {
            name: name.to_owned(),
            values: vec![None; len],
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    #[must_use]
    pub fn get(&self, row: usize) -> Option<f64> {
        self.values.get(row).copied().flatten()
    }

    /// Number of populated cells
    #[must_use]
    pub fn populated(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    #[must_use]
    pub fn missing(&self) -> usize {
        self.values.len() - self.populated()
    }
}

/// The measurement table: one row per timeline slot, columns unioned across
/// sources in the order they were first declared.
///
/// Cells start out missing (`None`), never zero.
#[derive(Debug, Clone)]
pub struct MeasurementTable {
    timeline: Timeline,
    columns: Vec<Column>,
    by_name: HashMap<String, usize>,
}

impl MeasurementTable {
    #[must_use]
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            columns: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Number of rows, always equal to the timeline length
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.timeline.len()
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.by_name.get(name).map(|&idx| &self.columns[idx])
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Declare a column, returning its position. Existing columns are kept as they are.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.by_name.get(name) {
            return idx;
        }
        let idx = self.columns.len();
        self.columns.push(Column::empty(name, self.timeline.len()));
        self.by_name.insert(name.to_owned(), idx);
        idx
    }

    /// Value at a column/row pair, `None` when missing or unknown
    #[must_use]
    pub fn get(&self, column: &str, row: usize) -> Option<f64> {
        self.column(column).and_then(|c| c.get(row))
    }

    /// Value at a timestamp, `None` when missing or not on the timeline
    #[must_use]
    pub fn get_at(&self, column: &str, timestamp: DateTime<Utc>) -> Option<f64> {
        match self.timeline.locate(timestamp) {
            Slot::At(row) => self.get(column, row),
            Slot::OffGrid | Slot::OutOfRange => None,
        }
    }

    pub(crate) fn column_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn values_mut(&mut self, column: usize) -> &mut [Option<f64>] {
        &mut self.columns[column].values
    }
}
