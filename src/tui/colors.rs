//! Heatmap color scale
//!
//! Kept bins are shaded from dark blue (low) through green and yellow to
//! red (the maximum of the displayed grid). Cut bins are drawn as gray dots.

use ndarray::Array2;
use ndarray_stats::QuantileExt;
use ratatui::style::Color;

use crate::surface::PreviewStyle;

pub const CUT_FG: Color = Color::DarkGray;

/// Pointer position on the heatmap
pub const MARKER_FG: Color = Color::White;

/// Color stops of the intensity scale, lowest first
const SCALE: [(u8, u8, u8); 5] = [
    (20, 30, 120),
    (0, 120, 230),
    (0, 190, 70),
    (250, 210, 0),
    (220, 30, 30),
];

/// Largest bin content, 0 for data without a usable maximum
pub fn content_max(content: &Array2<f64>) -> f64 {
    content.max().map(|&max| max).unwrap_or(0.0)
}

/// Background color of a kept bin
pub fn intensity_color(value: f64, max: f64) -> Color {
    if !(value > 0.0) || !(max > 0.0) {
        return Color::Reset;
    }
    let t = (value / max).clamp(0.0, 1.0) * (SCALE.len() - 1) as f64;
    let lower = (t.floor() as usize).min(SCALE.len() - 2);
    let frac = t - lower as f64;
    let (r0, g0, b0) = SCALE[lower];
    let (r1, g1, b1) = SCALE[lower + 1];
    let mix = |a: u8, b: u8| (f64::from(a) + frac * (f64::from(b) - f64::from(a))).round() as u8;
    Color::Rgb(mix(r0, r1), mix(g0, g1), mix(b0, b1))
}

pub fn preview_color(style: PreviewStyle) -> Color {
    match style {
        PreviewStyle::Active => Color::White,
        PreviewStyle::Confirmed => Color::Magenta,
    }
}
