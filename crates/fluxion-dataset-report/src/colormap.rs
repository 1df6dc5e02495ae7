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

use plotters::style::RGBColor;

/// Colour of missing cells; never produced by [`plasma`]
pub const MASK_COLOR: RGBColor = RGBColor(255, 255, 255);

/// Plasma colour map sampled every eighth of the range
const PLASMA: [(u8, u8, u8); 9] = [
    (13, 8, 135),
    (75, 3, 161),
    (125, 3, 168),
    (168, 34, 150),
    (203, 70, 121),
    (229, 107, 93),
    (248, 148, 65),
    (253, 195, 40),
    (240, 249, 33),
];

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "result is clamped to 0..=255"
)]
fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (f64::from(a) + (f64::from(b) - f64::from(a)) * t)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Plasma colour for an intensity in `[0, 1]`; values outside are clamped
#[must_use]
pub fn plasma(intensity: f64) -> RGBColor {
    let v = if intensity.is_finite() {
        intensity.clamp(0.0, 1.0)
    } else {
        0.0
    };

    let segments = PLASMA.len() - 1;
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "segment index is bounded by the table length"
    )]
    let (lower, t) = {
        let position = v * segments as f64;
        let lower = (position.floor() as usize).min(segments - 1);
        (lower, position - lower as f64)
    };

    let (r0, g0, b0) = PLASMA[lower];
    let (r1, g1, b1) = PLASMA[lower + 1];
    RGBColor(lerp(r0, r1, t), lerp(g0, g1, t), lerp(b0, b1, t))
}

/// Colour of one matrix cell
#[must_use]
pub fn cell_color(value: Option<f64>) -> RGBColor {
    value.map_or(MASK_COLOR, plasma)
}
