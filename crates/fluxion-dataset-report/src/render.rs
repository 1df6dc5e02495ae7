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

use std::fmt::Display;
use std::fs;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};
use tracing::info;

use crate::colormap::cell_color;
use crate::errors::{ReportError, ReportResult};
use crate::matrix::CompletenessMatrix;

const LABEL_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

fn render_error(e: impl Display) -> ReportError {
    ReportError::Render(e.to_string())
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ReportError + '_ {
    move |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Consecutive rows of one column sharing a colour, as `(first row, length, colour)`
#[must_use]
pub fn column_runs(matrix: &CompletenessMatrix, column: usize) -> Vec<(usize, usize, RGBColor)> {
    let mut runs: Vec<(usize, usize, RGBColor)> = Vec::new();
    let Some(values) = matrix.column(column) else {
        return runs;
    };
    for (row, value) in values.iter().enumerate() {
        let color = cell_color(*value);
        match runs.last_mut() {
            Some((_, len, last)) if *last == color => *len += 1,
            Some(_) | None => runs.push((row, 1, color)),
        }
    }
    runs
}

/// Fail early on a matrix with nothing to draw
pub fn check_drawable(matrix: &CompletenessMatrix) -> ReportResult<()> {
    if matrix.columns().is_empty() {
        return Err(ReportError::Empty("table has no columns".to_owned()));
    }
    if matrix.row_count() == 0 {
        return Err(ReportError::Empty("timeline has no full hours".to_owned()));
    }
    Ok(())
}

/// One column per measurement, one row per hour with the earliest hour on top
fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    matrix: &CompletenessMatrix,
) -> ReportResult<()> {
    check_drawable(matrix)?;
    register_font("sans-serif", FontStyle::Normal, LABEL_FONT)
        .map_err(|_| ReportError::Render("bundled label font is unreadable".to_owned()))?;

    let too_large = || ReportError::Render("matrix too large".to_owned());
    let column_count = i32::try_from(matrix.columns().len()).map_err(|_| too_large())?;
    let row_count = i32::try_from(matrix.row_count()).map_err(|_| too_large())?;

    let names = matrix.columns();
    let dates = matrix.dates();
    root.fill(&WHITE).map_err(render_error)?;

    let mut chart = ChartBuilder::on(root)
        .caption("Data completeness (hourly, normalized)", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(280)
        .y_label_area_size(110)
        .build_cartesian_2d(0..column_count, 0..row_count)
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(names.len())
        .y_labels(30)
        .x_label_formatter(&|x| {
            usize::try_from(*x)
                .ok()
                .and_then(|i| names.get(i))
                .cloned()
                .unwrap_or_default()
        })
        .y_label_formatter(&|y| {
            usize::try_from(row_count - 1 - *y)
                .ok()
                .and_then(|i| dates.get(i))
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .x_label_style(
            ("sans-serif", 12)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .y_label_style(("sans-serif", 12))
        .draw()
        .map_err(render_error)?;

    for (x, column) in (0..column_count).zip(0..names.len()) {
        let rects = column_runs(matrix, column).into_iter().filter_map(|(start, len, color)| {
            let start = i32::try_from(start).ok()?;
            let len = i32::try_from(len).ok()?;
            let top = row_count - start;
            Some(Rectangle::new([(x, top - len), (x + 1, top)], color.filled()))
        });
        chart.draw_series(rects).map_err(render_error)?;
    }

    root.present().map_err(render_error)
}

/// Render the matrix into a raw RGB buffer of `width * height * 3` bytes
pub fn render_rgb(matrix: &CompletenessMatrix, width: u32, height: u32) -> ReportResult<Vec<u8>> {
    let len = usize::try_from(u64::from(width) * u64::from(height) * 3)
        .map_err(|_| ReportError::Render("figure too large".to_owned()))?;
    let mut pixels = vec![0_u8; len];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        draw(&root, matrix)?;
    }
    Ok(pixels)
}

/// Render the matrix and write it to `path`, replacing any previous figure.
///
/// The image format follows the file extension (`.jpg` for the summary figure).
pub fn render_image(
    matrix: &CompletenessMatrix,
    path: &Path,
    width: u32,
    height: u32,
) -> ReportResult<()> {
    check_drawable(matrix)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    // keep the real extension last so the encoder still picks the format
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("jpg");
    let temp_path = path.with_extension(format!("tmp.{extension}"));
    {
        let root = BitMapBackend::new(&temp_path, (width, height)).into_drawing_area();
        draw(&root, matrix)?;
    }
    fs::rename(&temp_path, path).map_err(io_error(path))?;

    info!(
        "Completeness figure written to {} ({} columns x {} hours)",
        path.display(),
        matrix.columns().len(),
        matrix.row_count()
    );
    Ok(())
}
