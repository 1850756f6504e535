//! Heatmap widget
//!
//! Draws the displayed grid one terminal cell at a time: each cell shows the
//! bin under its center, cut bins as gray dots, and the preview overlay on top.

use ndarray::Array2;
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::Color,
    widgets::Widget,
};

use super::colors::{content_max, intensity_color, preview_color, CUT_FG, MARKER_FG};
use super::surface::ViewBounds;
use crate::grid::Grid;
use crate::surface::{Preview, PreviewStyle};

/// Data-space extent of one terminal cell
#[derive(Clone, Copy, Debug, PartialEq)]
struct CellExtent {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl CellExtent {
    fn new(view: &ViewBounds, area: Rect, column: u16, row: u16) -> Self {
        let dx = view.width() / f64::from(area.width);
        let dy = view.height() / f64::from(area.height);
        let x_min = view.x_min + f64::from(column) * dx;
        let y_max = view.y_max - f64::from(row) * dy;
        Self {
            x_min,
            x_max: x_min + dx,
            y_min: y_max - dy,
            y_max,
        }
    }

    fn center(&self) -> (f64, f64) {
        (
            0.5 * (self.x_min + self.x_max),
            0.5 * (self.y_min + self.y_max),
        )
    }

    fn contains_x(&self, x: f64) -> bool {
        x >= self.x_min && x < self.x_max
    }

    fn contains_y(&self, y: f64) -> bool {
        y >= self.y_min && y < self.y_max
    }

    fn overlaps_x(&self, lo: f64, hi: f64) -> bool {
        hi >= self.x_min && lo < self.x_max
    }

    fn overlaps_y(&self, lo: f64, hi: f64) -> bool {
        hi >= self.y_min && lo < self.y_max
    }
}

/// Style of the preview outline crossing `cell`, if any
fn preview_style_at(preview: &Preview, cell: &CellExtent) -> Option<PreviewStyle> {
    let hit = match preview {
        Preview::Rectangle { from, to } => {
            let (x_lo, x_hi) = (from.x.min(to.x), from.x.max(to.x));
            let (y_lo, y_hi) = (from.y.min(to.y), from.y.max(to.y));
            let vertical_edge =
                (cell.contains_x(x_lo) || cell.contains_x(x_hi)) && cell.overlaps_y(y_lo, y_hi);
            let horizontal_edge =
                (cell.contains_y(y_lo) || cell.contains_y(y_hi)) && cell.overlaps_x(x_lo, x_hi);
            vertical_edge || horizontal_edge
        }
        Preview::VerticalLines { x1, x2 } => cell.contains_x(*x1) || cell.contains_x(*x2),
        Preview::HorizontalLines { y1, y2 } => cell.contains_y(*y1) || cell.contains_y(*y2),
        Preview::Lines(lines) => {
            return lines.iter().find_map(|preview_line| {
                let a = preview_line.line.at(cell.x_min);
                let b = preview_line.line.at(cell.x_max);
                cell.overlaps_y(a.min(b), a.max(b))
                    .then_some(preview_line.style)
            });
        }
    };
    hit.then_some(PreviewStyle::Active)
}

pub struct Heatmap<'a> {
    grid: &'a Grid,
    cut: &'a Array2<bool>,
    view: ViewBounds,
    preview: Option<&'a Preview>,
    marker: Option<(u16, u16)>,
}

impl<'a> Heatmap<'a> {
    pub fn new(grid: &'a Grid, cut: &'a Array2<bool>, view: ViewBounds) -> Self {
        Self {
            grid,
            cut,
            view,
            preview: None,
            marker: None,
        }
    }

    pub fn preview(mut self, preview: Option<&'a Preview>) -> Self {
        self.preview = preview;
        self
    }

    /// Terminal cell under the pointer
    pub fn marker(mut self, cell: Option<(u16, u16)>) -> Self {
        self.marker = cell;
        self
    }
}

impl Widget for Heatmap<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let binning = self.grid.binning();
        let max = content_max(self.grid.content());

        for row in 0..area.height {
            for column in 0..area.width {
                let extent = CellExtent::new(&self.view, area, column, row);
                let Some(cell) = buf.cell_mut((area.x + column, area.y + row)) else {
                    continue;
                };
                let (x, y) = extent.center();
                if let (Some(ix), Some(iy)) = (binning.x.find_bin(x), binning.y.find_bin(y)) {
                    if self.cut.get([iy, ix]).copied().unwrap_or(false) {
                        cell.set_char('·').set_fg(CUT_FG).set_bg(Color::Reset);
                    } else {
                        let value = self.grid.content().get([iy, ix]).copied().unwrap_or(0.0);
                        cell.set_char(' ').set_bg(intensity_color(value, max));
                    }
                }
                if let Some(style) = self
                    .preview
                    .and_then(|preview| preview_style_at(preview, &extent))
                {
                    cell.set_char('•').set_fg(preview_color(style));
                }
            }
        }

        if let Some(position) = self.marker.filter(|&(x, y)| area.contains(Position { x, y })) {
            if let Some(cell) = buf.cell_mut(position) {
                cell.set_char('+').set_fg(MARKER_FG);
            }
        }
    }
}
