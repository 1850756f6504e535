// gridcut/src/surface.rs
//! The display the engine draws to. Hosts own the pixel/data transforms;
//! everything crossing this boundary is in data coordinates.

use crate::region::{Line, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewStyle {
    /// Follows the pointer.
    Active,
    /// Already confirmed part of an unfinished region.
    Confirmed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviewLine {
    pub line: Line,
    pub style: PreviewStyle,
}

/// Outline of a region that is still being entered.
#[derive(Clone, Debug, PartialEq)]
pub enum Preview {
    Rectangle { from: Point, to: Point },
    /// Two vertical lines spanning the whole Y range.
    VerticalLines { x1: f64, x2: f64 },
    /// Two horizontal lines spanning the whole X range.
    HorizontalLines { y1: f64, y2: f64 },
    /// Lines spanning the whole X range.
    Lines(Vec<PreviewLine>),
}

pub trait DisplaySurface {
    /// Replaces the current overlay; `None` clears it.
    fn show_preview(&mut self, preview: Option<Preview>);
    /// The mask or the displayed grid changed.
    fn refresh(&mut self, grid_index: usize);
    /// Drops any zoom/pan and shows the full grid.
    fn reset_view(&mut self);
}
