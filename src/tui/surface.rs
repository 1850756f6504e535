//! Terminal implementation of the display surface
//!
//! Owns the mapping between terminal cells and data coordinates, the zoom
//! state and the preview overlay handed over by the engine.

use ratatui::prelude::Rect;

use crate::grid::Binning;
use crate::region::Point;
use crate::surface::{DisplaySurface, Preview};

/// Zoom factor applied per scroll-wheel step
const ZOOM_STEP: f64 = 0.8;

/// Data-space rectangle currently shown
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl ViewBounds {
    pub fn from_binning(binning: &Binning) -> Self {
        Self {
            x_min: binning.x.low(),
            x_max: binning.x.high(),
            y_min: binning.y.low(),
            y_max: binning.y.high(),
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Scales the view around `anchor`, staying inside `limits`.
    fn zoomed(&self, anchor: Point, factor: f64, limits: &ViewBounds) -> Self {
        let width = (self.width() * factor).min(limits.width());
        let height = (self.height() * factor).min(limits.height());
        let fx = (anchor.x - self.x_min) / self.width();
        let fy = (anchor.y - self.y_min) / self.height();
        let x_min = (anchor.x - fx * width)
            .max(limits.x_min)
            .min(limits.x_max - width);
        let y_min = (anchor.y - fy * height)
            .max(limits.y_min)
            .min(limits.y_max - height);
        Self {
            x_min,
            x_max: x_min + width,
            y_min,
            y_max: y_min + height,
        }
    }
}

/// Display state of the heatmap panel
#[derive(Debug)]
pub struct TerminalSurface {
    full: ViewBounds,
    view: ViewBounds,
    area: Rect,
    preview: Option<Preview>,
    displayed_grid: usize,
    stale: bool,
}

impl TerminalSurface {
    pub fn new(binning: &Binning) -> Self {
        let full = ViewBounds::from_binning(binning);
        Self {
            full,
            view: full,
            area: Rect::default(),
            preview: None,
            displayed_grid: 0,
            stale: true,
        }
    }

    /// Remember where the heatmap was drawn (inner area, without borders)
    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
    }

    pub fn view(&self) -> ViewBounds {
        self.view
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn displayed_grid(&self) -> usize {
        self.displayed_grid
    }

    /// Returns whether the grid needs to be redrawn and clears the flag
    pub fn take_stale(&mut self) -> bool {
        std::mem::replace(&mut self.stale, false)
    }

    /// Data coordinates at the center of a terminal cell
    pub fn to_data(&self, column: u16, row: u16) -> Option<Point> {
        let area = self.area;
        if area.width == 0
            || area.height == 0
            || column < area.x
            || row < area.y
            || column >= area.x + area.width
            || row >= area.y + area.height
        {
            return None;
        }
        let fx = (f64::from(column - area.x) + 0.5) / f64::from(area.width);
        // rows grow downwards, y grows upwards
        let fy = (f64::from(row - area.y) + 0.5) / f64::from(area.height);
        Some(Point::new(
            self.view.x_min + fx * self.view.width(),
            self.view.y_max - fy * self.view.height(),
        ))
    }

    /// Terminal cell showing a data point, if visible
    pub fn to_cell(&self, point: Point) -> Option<(u16, u16)> {
        let area = self.area;
        let fx = (point.x - self.view.x_min) / self.view.width();
        let fy = (self.view.y_max - point.y) / self.view.height();
        if !(0.0..1.0).contains(&fx) || !(0.0..1.0).contains(&fy) {
            return None;
        }
        let column = (fx * f64::from(area.width)) as u16;
        let row = (fy * f64::from(area.height)) as u16;
        if column >= area.width || row >= area.height {
            return None;
        }
        Some((area.x + column, area.y + row))
    }

    pub fn zoom_in(&mut self, anchor: Point) {
        self.view = self.view.zoomed(anchor, ZOOM_STEP, &self.full);
    }

    pub fn zoom_out(&mut self, anchor: Point) {
        self.view = self.view.zoomed(anchor, 1.0 / ZOOM_STEP, &self.full);
    }

    pub fn is_zoomed(&self) -> bool {
        self.view != self.full
    }
}

impl DisplaySurface for TerminalSurface {
    fn show_preview(&mut self, preview: Option<Preview>) {
        self.preview = preview;
    }

    fn refresh(&mut self, grid_index: usize) {
        self.displayed_grid = grid_index;
        self.stale = true;
    }

    fn reset_view(&mut self) {
        self.view = self.full;
    }
}
