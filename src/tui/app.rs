//! Main application state
//!
//! Translates terminal input into engine events and keeps the masked grid
//! that is currently on screen.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use log::debug;
use ndarray::Array2;
use std::time::{Duration, Instant};

use super::surface::TerminalSurface;
use crate::engine::{CutEngine, CutEvent, EventOutcome};
use crate::errors::{EngineError, PreconditionError};
use crate::grid::Grid;
use crate::region::Point;
use crate::store::UndoOutcome;

/// Main application state
pub struct App {
    pub engine: CutEngine,

    pub surface: TerminalSurface,

    /// Current grid with the cuts applied
    pub display: Grid,

    /// Cut mask matching `display`
    pub cut_mask: Array2<bool>,

    /// Share of the current grid's content removed by the cuts
    pub data_lost: f64,

    /// Last pointer position over the heatmap, in data coordinates
    pub pointer: Option<Point>,

    pub show_help: bool,

    /// Animation frame counter (for the spinner)
    pub frame: usize,

    /// Status message (bottom bar)
    pub status_message: Option<StatusMessage>,

    /// Region store revision at the last save
    pub saved_revision: Option<u64>,

    pub should_quit: bool,
}

/// Status message displayed at the bottom
#[derive(Clone, Debug)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub expires: Instant,
}

/// Status message severity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl App {
    /// The engine must be ready: at least one grid and an output path.
    pub fn new(mut engine: CutEngine) -> Result<Self, EngineError> {
        engine.ensure_ready()?;
        let binning = engine
            .binning()
            .cloned()
            .ok_or(PreconditionError::NoGrid)?;
        let index = engine.current_grid();
        let display = engine.masked_grid(index)?;
        let cut_mask = engine.mask()?.clone();
        let data_lost = engine.data_lost_fraction(index)?;
        Ok(Self {
            engine,
            surface: TerminalSurface::new(&binning),
            display,
            cut_mask,
            data_lost,
            pointer: None,
            show_help: false,
            frame: 0,
            status_message: None,
            saved_revision: None,
            should_quit: false,
        })
    }

    pub fn on_tick(&mut self) {
        self.frame = self.frame.wrapping_add(1);

        // Clear expired status messages
        if let Some(ref msg) = self.status_message {
            if Instant::now() > msg.expires {
                self.status_message = None;
            }
        }
    }

    /// Handle key events
    pub fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('?') | KeyCode::F(1) => {
                self.show_help = !self.show_help;
            }
            KeyCode::Esc if self.show_help => {
                self.show_help = false;
            }
            KeyCode::Char(c) => self.dispatch(CutEvent::KeyPress(c)),
            _ => {}
        }
    }

    /// Handle mouse events
    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        let Some(point) = self.surface.to_data(mouse.column, mouse.row) else {
            if matches!(mouse.kind, MouseEventKind::Moved) {
                self.pointer = None;
            }
            return;
        };

        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                self.pointer = Some(point);
                self.dispatch(CutEvent::PointerMotion {
                    x: point.x,
                    y: point.y,
                });
            }
            MouseEventKind::Down(MouseButton::Left) => {
                self.pointer = Some(point);
                self.dispatch(CutEvent::PointerPress {
                    x: point.x,
                    y: point.y,
                });
            }
            MouseEventKind::ScrollUp => self.surface.zoom_in(point),
            MouseEventKind::ScrollDown => self.surface.zoom_out(point),
            _ => {}
        }
    }

    fn dispatch(&mut self, event: CutEvent) {
        let result = self.engine.handle_event(event, &mut self.surface);
        if self.surface.take_stale() {
            if let Err(e) = self.update_display() {
                self.show_error(e);
                return;
            }
        }
        match result {
            Ok(outcome) => self.report(outcome),
            Err(e) => self.show_error(e),
        }
    }

    /// Stderr is covered by the alternate screen, so errors only reach the status bar
    fn show_error(&mut self, e: EngineError) {
        debug!("{}", e);
        self.set_status(e.to_string(), StatusLevel::Error);
    }

    /// Recompute the masked grid shown on screen
    fn update_display(&mut self) -> Result<(), EngineError> {
        let index = self.surface.displayed_grid();
        self.display = self.engine.masked_grid(index)?;
        self.cut_mask = self.engine.mask()?.clone();
        self.data_lost = self.engine.data_lost_fraction(index)?;
        Ok(())
    }

    fn report(&mut self, outcome: EventOutcome) {
        match outcome {
            EventOutcome::Ignored | EventOutcome::Previewed => {}
            EventOutcome::PointRecorded => {
                self.set_status("Point recorded", StatusLevel::Info);
            }
            EventOutcome::RegionAdded(region) => {
                self.set_status(format!("Added {}", region), StatusLevel::Success);
            }
            EventOutcome::Undone(UndoOutcome::DroppedPendingPoint) => {
                self.set_status("Dropped last point", StatusLevel::Info);
            }
            EventOutcome::Undone(UndoOutcome::RemovedRegion(region)) => {
                self.set_status(format!("Deleted {}", region), StatusLevel::Info);
            }
            EventOutcome::Warning(warning) => {
                self.set_status(warning.to_string(), StatusLevel::Warning);
            }
            EventOutcome::ModeChanged(Some(mode)) => {
                self.set_status(format!("Mode: {}", mode), StatusLevel::Info);
            }
            EventOutcome::ModeChanged(None) => {
                self.set_status("Cutting disabled", StatusLevel::Info);
            }
            EventOutcome::GridSwitched(_) => {
                self.set_status(format!("Showing {}", self.display.name()), StatusLevel::Info);
            }
            EventOutcome::ViewReset => {
                self.set_status("View reset", StatusLevel::Info);
            }
            EventOutcome::MaskSaved(path) => {
                self.saved_revision = Some(self.engine.store().revision());
                self.set_status(
                    format!("Cuts written to {}", path.display()),
                    StatusLevel::Success,
                );
            }
        }
    }

    /// Set a status message
    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            level,
            expires: Instant::now() + Duration::from_secs(5),
        });
    }

    /// Whether regions changed since the last save
    pub fn has_unsaved_cuts(&self) -> bool {
        let revision = self.engine.store().revision();
        match self.saved_revision {
            Some(saved) => saved != revision,
            None => revision > 0,
        }
    }

    /// Get spinner character for current frame
    pub fn spinner(&self) -> char {
        const SPINNER: &[char] = &['|', '/', '-', '\\'];
        SPINNER[self.frame % SPINNER.len()]
    }
}
