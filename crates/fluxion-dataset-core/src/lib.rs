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

//! FluxION dataset core
//!
//! Time alignment for PV plant measurements coming from several loggers:
//!
//! - **Timeline**: the canonical fixed-step index every source is projected onto
//! - **Measurement table**: one row per timeline slot, one column per metric, missing cells kept as missing
//! - **Localization**: local logger time to UTC, with daylight-saving ambiguity made explicit
//! - **Merge**: exact and interpolated alignment with explicit conflict handling
//! - **Rollup**: monthly energy/irradiation totals
//! - **Storage**: CSV persistence of the table and the rollup

pub mod errors;
pub mod localize;
pub mod merge;
pub mod rollup;
pub mod storage;
pub mod table;
pub mod timeline;

pub use errors::{DatasetError, DatasetResult};
pub use localize::{AmbiguityPolicy, Localized, LocalizationAudit, Unresolvable, localize_series};
pub use merge::{
    Alignment, ConflictPolicy, MergePolicy, MergeReport, OutOfRangePolicy, Provenance,
    SourceRecord, SourceSeries, interpolate_linear, merge_series,
};
pub use rollup::{MonthlyRollup, RollupRow};
pub use table::{Column, MeasurementTable};
pub use timeline::{Slot, Timeline};
