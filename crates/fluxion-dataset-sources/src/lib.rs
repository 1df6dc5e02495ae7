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

//! Readers for the three measurement sources of the plant:
//!
//! - **Inverter**: monthly SmartLogger exports, one workbook per inverter
//! - **Weather station**: monthly EMI exports, several sensors per workbook
//! - **Archive**: daily DMI observation dumps, one JSON object per line
//!
//! Each reader takes the measurement table by value, merges its own columns
//! and hands the table back together with a [`SourceReport`].

pub mod archive;
pub mod errors;
pub mod inverter;
pub mod manifest;
pub mod report;
pub mod sheet;
pub mod weather_station;
pub mod workbook;

pub use archive::{ArchiveSource, GHI_COLUMN, merge_archive};
pub use errors::{MissingFile, SourceError, SourceResult};
pub use inverter::{InverterSource, inverter_columns, merge_inverter};
pub use manifest::{Manifest, ManifestEntry, Period, SourceKind};
pub use report::SourceReport;
pub use sheet::SheetLayout;
pub use weather_station::{
    AMBIENT_TEMPERATURE_COLUMN, WeatherStationSource, irradiance_column, merge_weather_station,
};
pub use workbook::{MemoryWorkbooks, WorkbookSource, XlsxWorkbooks};
