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

use std::fmt;
use std::path::PathBuf;

use fluxion_dataset_core::DatasetError;
use thiserror::Error;

/// A manifest entry whose file could not be found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFile {
    pub source: String,
    pub period: String,
    pub path: PathBuf,
}

impl fmt::Display for MissingFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file unavailable for period {}: {}",
            self.source,
            self.period,
            self.path.display()
        )
    }
}

fn list_missing(missing: &[MissingFile]) -> String {
    missing
        .iter()
        .map(|m| format!("  - {m}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Source reader error types
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("{} source file(s) unavailable:\n{}", .0.len(), list_missing(.0))]
    Unavailable(Vec<MissingFile>),

    #[error("{kind} has no files per {period}")]
    PeriodMismatch { kind: String, period: String },

    #[error("Failed to open workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    #[error("Sheet '{sheet}' not found in {path}")]
    MissingSheet { path: PathBuf, sheet: String },

    #[error("Sheet in {path} has no header at row {row}")]
    MissingHeader { path: PathBuf, row: u32 },

    #[error("Column '{column}' not found in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Unreadable timestamp '{value}' in {path} at row {row}")]
    Timestamp {
        path: PathBuf,
        row: u32,
        value: String,
    },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

pub type SourceResult<T> = Result<T, SourceError>;
