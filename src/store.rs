// gridcut/src/store.rs
//! Completed cut regions plus the pending point entries of every mode.
//!
//! Axis-aligned shapes take two presses; the angled band takes four (two per
//! line). A region is appended only once its last point arrives, so a
//! half-entered shape never influences the mask.

use crate::errors::StateWarning;
use crate::grid::{Axis, Binning};
use crate::region::{CutMode, CutRegion, Line, Point};
use log::{debug, info};

/// Entry phase of the two-point shapes.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum EntryPhase {
    #[default]
    AwaitingFirstPoint,
    AwaitingSecondPoint(Point),
}

/// Entry phase of the angled band: two lines, two points each.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum AngledPhase {
    #[default]
    FirstLineStart,
    FirstLineEnd {
        start: Point,
    },
    SecondLineStart {
        first: Line,
    },
    SecondLineEnd {
        first: Line,
        start: Point,
    },
}

#[derive(Clone, Debug, Default)]
struct PendingEntries {
    rectangle: EntryPhase,
    band_x: EntryPhase,
    band_y: EntryPhase,
    inverse_rectangle: EntryPhase,
    angled_band: AngledPhase,
}

impl PendingEntries {
    fn pair(&self, mode: CutMode) -> Option<&EntryPhase> {
        match mode {
            CutMode::Rectangle => Some(&self.rectangle),
            CutMode::BandX => Some(&self.band_x),
            CutMode::BandY => Some(&self.band_y),
            CutMode::InverseRectangle => Some(&self.inverse_rectangle),
            CutMode::AngledBand | CutMode::SingleBin => None,
        }
    }

    fn pair_mut(&mut self, mode: CutMode) -> Option<&mut EntryPhase> {
        match mode {
            CutMode::Rectangle => Some(&mut self.rectangle),
            CutMode::BandX => Some(&mut self.band_x),
            CutMode::BandY => Some(&mut self.band_y),
            CutMode::InverseRectangle => Some(&mut self.inverse_rectangle),
            CutMode::AngledBand | CutMode::SingleBin => None,
        }
    }
}

/// Result of a pointer press.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointOutcome {
    /// The point was stored as part of an unfinished region.
    Pending,
    Completed(CutRegion),
    Rejected(StateWarning),
}

/// Result of a successful undo.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UndoOutcome {
    DroppedPendingPoint,
    RemovedRegion(CutRegion),
}

/// Ordered collection of every completed region plus per-mode entry state.
#[derive(Clone, Debug, Default)]
pub struct RegionStore {
    regions: Vec<CutRegion>,
    pending: PendingEntries,
    revision: u64,
}

impl RegionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regions(&self) -> &[CutRegion] {
        &self.regions
    }

    pub fn regions_of(&self, mode: CutMode) -> impl Iterator<Item = &CutRegion> + '_ {
        self.regions.iter().filter(move |region| region.mode() == mode)
    }

    pub fn count(&self, mode: CutMode) -> usize {
        self.regions_of(mode).count()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Bumped whenever the set of completed regions changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn phase(&self, mode: CutMode) -> Option<EntryPhase> {
        self.pending.pair(mode).copied()
    }

    pub fn angled_phase(&self) -> AngledPhase {
        self.pending.angled_band
    }

    pub fn has_pending(&self, mode: CutMode) -> bool {
        match mode {
            CutMode::AngledBand => self.pending.angled_band != AngledPhase::FirstLineStart,
            CutMode::SingleBin => false,
            _ => matches!(
                self.pending.pair(mode),
                Some(EntryPhase::AwaitingSecondPoint(_))
            ),
        }
    }

    /// Feeds one pointer press in `mode` through the entry protocol.
    pub fn begin_or_complete_point(
        &mut self,
        mode: CutMode,
        point: Point,
        binning: &Binning,
    ) -> PointOutcome {
        match mode {
            CutMode::SingleBin => {
                debug!("Setting point to cut at ({}, {})", point.x, point.y);
                self.push(CutRegion::SingleBin {
                    x: point.x,
                    y: point.y,
                })
            }
            CutMode::AngledBand => self.advance_angled_band(point, binning),
            _ => self.advance_pair(mode, point, binning),
        }
    }

    fn advance_pair(&mut self, mode: CutMode, point: Point, binning: &Binning) -> PointOutcome {
        let Some(phase) = self.pending.pair_mut(mode) else {
            return PointOutcome::Pending;
        };
        let first = match *phase {
            EntryPhase::AwaitingFirstPoint => {
                *phase = EntryPhase::AwaitingSecondPoint(point);
                debug!("Setting the first point of a {} at ({}, {})", mode, point.x, point.y);
                return PointOutcome::Pending;
            }
            EntryPhase::AwaitingSecondPoint(first) => first,
        };
        *phase = EntryPhase::AwaitingFirstPoint;

        let region = match mode {
            CutMode::Rectangle => {
                let (x_min, x_max) = snap_outward(&binning.x, first.x, point.x);
                let (y_min, y_max) = snap_outward(&binning.y, first.y, point.y);
                CutRegion::Rectangle {
                    x_min,
                    x_max,
                    y_min,
                    y_max,
                }
            }
            CutMode::InverseRectangle => {
                let (x_min, x_max) = snap_inward(&binning.x, first.x, point.x);
                let (y_min, y_max) = snap_inward(&binning.y, first.y, point.y);
                CutRegion::InverseRectangle {
                    x_min,
                    x_max,
                    y_min,
                    y_max,
                }
            }
            CutMode::BandX => {
                let (x_min, x_max) = snap_outward(&binning.x, first.x, point.x);
                CutRegion::BandX { x_min, x_max }
            }
            _ => {
                let (y_min, y_max) = snap_outward(&binning.y, first.y, point.y);
                CutRegion::BandY { y_min, y_max }
            }
        };
        self.push(region)
    }

    fn advance_angled_band(&mut self, point: Point, binning: &Binning) -> PointOutcome {
        let snapped = snap_to_low_edges(binning, point);
        match self.pending.angled_band {
            AngledPhase::FirstLineStart => {
                self.pending.angled_band = AngledPhase::FirstLineEnd { start: snapped };
                debug!("Setting the first point of the first line");
                PointOutcome::Pending
            }
            AngledPhase::FirstLineEnd { start } => match Line::through(start, snapped) {
                Some(first) => {
                    self.pending.angled_band = AngledPhase::SecondLineStart { first };
                    debug!("Setting the second point of the first line");
                    PointOutcome::Pending
                }
                None => PointOutcome::Rejected(StateWarning::VerticalLine),
            },
            AngledPhase::SecondLineStart { first } => {
                self.pending.angled_band = AngledPhase::SecondLineEnd {
                    first,
                    start: snapped,
                };
                debug!("Setting the first point of the second line");
                PointOutcome::Pending
            }
            AngledPhase::SecondLineEnd { first, start } => match Line::through(start, snapped) {
                Some(second) => {
                    self.pending.angled_band = AngledPhase::FirstLineStart;
                    self.push(CutRegion::AngledBand { first, second })
                }
                None => PointOutcome::Rejected(StateWarning::VerticalLine),
            },
        }
    }

    /// Drops the most recently entered pending point of `mode`, or else its
    /// most recently completed region.
    pub fn undo(&mut self, mode: CutMode) -> Result<UndoOutcome, StateWarning> {
        let dropped = match mode {
            CutMode::AngledBand => {
                let previous = match self.pending.angled_band {
                    AngledPhase::FirstLineStart => None,
                    AngledPhase::FirstLineEnd { .. } | AngledPhase::SecondLineStart { .. } => {
                        Some(AngledPhase::FirstLineStart)
                    }
                    AngledPhase::SecondLineEnd { first, .. } => {
                        Some(AngledPhase::SecondLineStart { first })
                    }
                };
                previous.map(|phase| self.pending.angled_band = phase)
            }
            _ => match self.pending.pair_mut(mode) {
                Some(phase) if matches!(phase, EntryPhase::AwaitingSecondPoint(_)) => {
                    *phase = EntryPhase::AwaitingFirstPoint;
                    Some(())
                }
                _ => None,
            },
        };
        if dropped.is_some() {
            debug!("Deleting last pending point of the {}", mode);
            return Ok(UndoOutcome::DroppedPendingPoint);
        }

        let index = self
            .regions
            .iter()
            .rposition(|region| region.mode() == mode)
            .ok_or(StateWarning::NothingToUndo(mode))?;
        let removed = self.regions.remove(index);
        self.revision += 1;
        info!("Deleted {}", removed);
        Ok(UndoOutcome::RemovedRegion(removed))
    }

    fn push(&mut self, region: CutRegion) -> PointOutcome {
        info!("Added {}", region);
        self.regions.push(region);
        self.revision += 1;
        PointOutcome::Completed(region)
    }
}

/// Smaller value to the lower edge of its bin, larger value to the upper edge of its bin.
fn snap_outward(axis: &Axis, a: f64, b: f64) -> (f64, f64) {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    (axis.low_edge(axis.clamp_bin(lo)), axis.up_edge(axis.clamp_bin(hi)))
}

/// Smaller value to the upper edge of its bin, larger value to the lower edge of its bin.
fn snap_inward(axis: &Axis, a: f64, b: f64) -> (f64, f64) {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    (axis.up_edge(axis.clamp_bin(lo)), axis.low_edge(axis.clamp_bin(hi)))
}

fn snap_to_low_edges(binning: &Binning, point: Point) -> Point {
    Point::new(
        binning.x.low_edge(binning.x.clamp_bin(point.x)),
        binning.y.low_edge(binning.y.clamp_bin(point.y)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::unit_binning;

    fn press(store: &mut RegionStore, mode: CutMode, x: f64, y: f64) -> PointOutcome {
        store.begin_or_complete_point(mode, Point::new(x, y), &unit_binning(10, 10))
    }

    #[test]
    fn test_rectangle_snaps_to_bin_edges() {
        let mut store = RegionStore::new();
        assert_eq!(press(&mut store, CutMode::Rectangle, 6.7, 6.2), PointOutcome::Pending);
        assert!(store.is_empty());
        assert!(store.has_pending(CutMode::Rectangle));

        let outcome = press(&mut store, CutMode::Rectangle, 3.4, 3.9);
        assert_eq!(
            outcome,
            PointOutcome::Completed(CutRegion::Rectangle {
                x_min: 3.0,
                x_max: 7.0,
                y_min: 3.0,
                y_max: 7.0
            })
        );
        assert!(!store.has_pending(CutMode::Rectangle));
        assert_eq!(store.count(CutMode::Rectangle), 1);
    }

    #[test]
    fn test_inverse_rectangle_snaps_inward() {
        let mut store = RegionStore::new();
        press(&mut store, CutMode::InverseRectangle, 2.5, 2.5);
        let outcome = press(&mut store, CutMode::InverseRectangle, 7.5, 8.5);
        assert_eq!(
            outcome,
            PointOutcome::Completed(CutRegion::InverseRectangle {
                x_min: 3.0,
                x_max: 7.0,
                y_min: 3.0,
                y_max: 8.0
            })
        );
    }

    #[test]
    fn test_bands_snap_single_axis() {
        let mut store = RegionStore::new();
        press(&mut store, CutMode::BandX, 5.5, 9.9);
        assert_eq!(
            press(&mut store, CutMode::BandX, 4.1, 0.1),
            PointOutcome::Completed(CutRegion::BandX {
                x_min: 4.0,
                x_max: 6.0
            })
        );
        press(&mut store, CutMode::BandY, 0.0, 1.2);
        assert_eq!(
            press(&mut store, CutMode::BandY, 0.0, 1.8),
            PointOutcome::Completed(CutRegion::BandY {
                y_min: 1.0,
                y_max: 2.0
            })
        );
    }

    #[test]
    fn test_pending_entries_survive_other_modes() {
        let mut store = RegionStore::new();
        press(&mut store, CutMode::Rectangle, 1.5, 1.5);
        press(&mut store, CutMode::BandX, 4.5, 0.0);
        press(&mut store, CutMode::BandX, 5.5, 0.0);
        assert_eq!(
            store.phase(CutMode::Rectangle),
            Some(EntryPhase::AwaitingSecondPoint(Point::new(1.5, 1.5)))
        );
        assert!(matches!(
            press(&mut store, CutMode::Rectangle, 2.5, 2.5),
            PointOutcome::Completed(CutRegion::Rectangle { .. })
        ));
    }

    #[test]
    fn test_angled_band_needs_two_lines() {
        let mut store = RegionStore::new();
        assert_eq!(press(&mut store, CutMode::AngledBand, 0.5, 0.5), PointOutcome::Pending);
        assert_eq!(press(&mut store, CutMode::AngledBand, 4.5, 4.5), PointOutcome::Pending);
        assert!(matches!(
            store.angled_phase(),
            AngledPhase::SecondLineStart { .. }
        ));
        assert_eq!(press(&mut store, CutMode::AngledBand, 0.5, 2.5), PointOutcome::Pending);
        assert!(store.is_empty());

        match press(&mut store, CutMode::AngledBand, 4.5, 6.5) {
            PointOutcome::Completed(CutRegion::AngledBand { first, second }) => {
                assert_eq!(first.tan_alpha, 1.0);
                assert_eq!(first.shift_y, 0.0);
                assert_eq!(second.tan_alpha, 1.0);
                assert_eq!(second.shift_y, 2.0);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(store.angled_phase(), AngledPhase::FirstLineStart);
    }

    #[test]
    fn test_angled_band_rejects_vertical_line() {
        let mut store = RegionStore::new();
        press(&mut store, CutMode::AngledBand, 2.2, 1.0);
        assert_eq!(
            press(&mut store, CutMode::AngledBand, 2.8, 7.0),
            PointOutcome::Rejected(StateWarning::VerticalLine)
        );
        assert!(matches!(store.angled_phase(), AngledPhase::FirstLineEnd { .. }));
    }

    #[test]
    fn test_undo_drops_pending_before_completed() {
        let mut store = RegionStore::new();
        press(&mut store, CutMode::Rectangle, 1.5, 1.5);
        press(&mut store, CutMode::Rectangle, 2.5, 2.5);
        press(&mut store, CutMode::Rectangle, 5.5, 5.5);
        let revision = store.revision();

        assert_eq!(store.undo(CutMode::Rectangle), Ok(UndoOutcome::DroppedPendingPoint));
        assert_eq!(store.revision(), revision);
        assert_eq!(store.count(CutMode::Rectangle), 1);

        assert!(matches!(
            store.undo(CutMode::Rectangle),
            Ok(UndoOutcome::RemovedRegion(CutRegion::Rectangle { .. }))
        ));
        assert!(store.revision() > revision);
        assert_eq!(
            store.undo(CutMode::Rectangle),
            Err(StateWarning::NothingToUndo(CutMode::Rectangle))
        );
    }

    #[test]
    fn test_undo_only_touches_its_mode() {
        let mut store = RegionStore::new();
        press(&mut store, CutMode::SingleBin, 0.2, 0.2);
        press(&mut store, CutMode::BandY, 0.0, 3.5);
        press(&mut store, CutMode::BandY, 0.0, 4.5);
        press(&mut store, CutMode::SingleBin, 9.2, 9.2);

        assert_eq!(
            store.undo(CutMode::BandY),
            Ok(UndoOutcome::RemovedRegion(CutRegion::BandY {
                y_min: 3.0,
                y_max: 5.0
            }))
        );
        assert_eq!(store.count(CutMode::SingleBin), 2);
        assert_eq!(
            store.undo(CutMode::SingleBin),
            Ok(UndoOutcome::RemovedRegion(CutRegion::SingleBin { x: 9.2, y: 9.2 }))
        );
        assert_eq!(store.regions(), &[CutRegion::SingleBin { x: 0.2, y: 0.2 }]);
    }

    #[test]
    fn test_angled_undo_steps_back() {
        let mut store = RegionStore::new();
        press(&mut store, CutMode::AngledBand, 0.5, 0.5);
        press(&mut store, CutMode::AngledBand, 4.5, 4.5);
        press(&mut store, CutMode::AngledBand, 0.5, 2.5);

        assert_eq!(store.undo(CutMode::AngledBand), Ok(UndoOutcome::DroppedPendingPoint));
        assert!(matches!(store.angled_phase(), AngledPhase::SecondLineStart { .. }));
        assert_eq!(store.undo(CutMode::AngledBand), Ok(UndoOutcome::DroppedPendingPoint));
        assert_eq!(store.angled_phase(), AngledPhase::FirstLineStart);
        assert_eq!(
            store.undo(CutMode::AngledBand),
            Err(StateWarning::NothingToUndo(CutMode::AngledBand))
        );
    }
}
