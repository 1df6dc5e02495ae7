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


//! FluxION dataset merger
//!
//! Loads the run configuration, checks that every input file is present and
//! drives the inverter, weather-station and archive readers over one
//! measurement table before writing the monthly rollup and the completeness figure.

pub mod config;
pub mod pipeline;

pub use config::{AppConfig, DEFAULT_CONFIG_PATH, ValidationResult};
pub use pipeline::{RunOptions, RunSummary, build_manifest, preflight, run};
