//! Terminal front end for the cutting engine
//!
//! Draws the current grid as a heatmap, turns mouse and key input into
//! engine events and shows the engine's previews and status.

mod app;
mod colors;
mod event;
mod heatmap;
mod surface;
pub mod ui;

pub use app::{App, StatusLevel, StatusMessage};
pub use event::{Event, EventHandler};
pub use heatmap::Heatmap;
pub use surface::{TerminalSurface, ViewBounds};
