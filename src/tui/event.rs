//! Event handling for the TUI
//!
//! Pumps crossterm events into a channel from a background task

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, MouseEvent, MouseEventKind};
use log::trace;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Application events
#[derive(Debug, Clone)]
pub enum Event {
    /// Periodic tick for status expiry and the spinner
    Tick,
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
}

/// Event handler that polls for terminal events
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
}

/// Minimum interval between pointer motion events (16ms = ~60fps)
const MOTION_THROTTLE_MS: u64 = 16;

fn is_motion(kind: MouseEventKind) -> bool {
    matches!(kind, MouseEventKind::Moved | MouseEventKind::Drag(_))
}

/// Rate limit for pointer motion. The latest motion held back is kept
/// so the pointer never rests on a stale position.
#[derive(Debug)]
struct MotionThrottle {
    interval: Duration,
    last: Option<Instant>,
    pending: Option<MouseEvent>,
}

impl MotionThrottle {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
            pending: None,
        }
    }

    /// The event to forward now, if any
    fn filter(&mut self, mouse: MouseEvent, now: Instant) -> Option<MouseEvent> {
        if !is_motion(mouse.kind) {
            // presses carry their own position
            self.pending = None;
            return Some(mouse);
        }
        if let Some(last) = self.last {
            if now.duration_since(last) < self.interval {
                self.pending = Some(mouse);
                return None;
            }
        }
        self.last = Some(now);
        self.pending = None;
        Some(mouse)
    }

    /// Releases the motion held back since the last forwarded one
    fn flush(&mut self, now: Instant) -> Option<MouseEvent> {
        let mouse = self.pending.take()?;
        self.last = Some(now);
        Some(mouse)
    }

    fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl EventHandler {
    /// Create a new event handler with the given tick rate in milliseconds
    pub fn new(tick_rate_ms: u64) -> Self {
        let tick_rate = Duration::from_millis(tick_rate_ms);
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            // every preview redraw walks the whole heatmap
            let mut throttle = MotionThrottle::new(Duration::from_millis(MOTION_THROTTLE_MS));

            loop {
                let timeout = if throttle.has_pending() {
                    throttle.interval
                } else {
                    tick_rate
                };
                let event = if event::poll(timeout).unwrap_or(false) {
                    match event::read() {
                        Ok(CrosstermEvent::Key(key)) => Event::Key(key),
                        Ok(CrosstermEvent::Mouse(mouse)) => {
                            match throttle.filter(mouse, Instant::now()) {
                                Some(mouse) => Event::Mouse(mouse),
                                None => continue,
                            }
                        }
                        Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
                        Ok(other) => {
                            trace!("Ignoring terminal event {:?}", other);
                            continue;
                        }
                        Err(_) => break,
                    }
                } else if let Some(mouse) = throttle.flush(Instant::now()) {
                    Event::Mouse(mouse)
                } else {
                    Event::Tick
                };
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }

    /// Wait for the next event
    pub async fn next(&mut self) -> anyhow::Result<Event> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("Event channel closed"))
    }
}
