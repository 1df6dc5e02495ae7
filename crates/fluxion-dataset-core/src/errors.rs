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

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building, merging or persisting the measurement table
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Invalid timeline {start} .. {end}: {reason}")]
    InvalidTimeline {
        start: String,
        end: String,
        reason: String,
    },

    #[error("Timestamp {timestamp} for column '{column}' is not on the {step_minutes}-minute grid")]
    OffGrid {
        column: String,
        timestamp: DateTime<Utc>,
        step_minutes: i64,
    },

    #[error("Timestamp {timestamp} for column '{column}' is outside the timeline")]
    OutOfRange {
        column: String,
        timestamp: DateTime<Utc>,
    },

    #[error(
        "Conflicting write to '{column}' at {timestamp}: existing {existing}, incoming {incoming}"
    )]
    Conflict {
        column: String,
        timestamp: DateTime<Utc>,
        existing: f64,
        incoming: f64,
    },

    #[error(
        "Native step of {native_minutes} min cannot be aligned to a {canonical_minutes} min timeline"
    )]
    IncompatibleStep {
        native_minutes: i64,
        canonical_minutes: i64,
    },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Malformed table file {path}: {message}")]
    MalformedTable { path: PathBuf, message: String },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type DatasetResult<T> = Result<T, DatasetError>;
