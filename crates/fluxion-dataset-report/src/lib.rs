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


//! Completeness heatmap of a measurement table, rendered to a bitmap image.

pub mod colormap;
pub mod errors;
pub mod matrix;
pub mod render;

pub use colormap::{MASK_COLOR, cell_color, plasma};
pub use errors::{ReportError, ReportResult};
pub use matrix::CompletenessMatrix;
pub use render::{check_drawable, column_runs, render_image, render_rgb};
