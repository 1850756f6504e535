// gridcut/src/engine.rs
//! The interactive cutting session.
//!
//! A [`CutEngine`] owns the registered grids, the region store and the
//! optional mask loaded from file. Hosts feed it [`CutEvent`]s in data
//! coordinates together with a [`DisplaySurface`] it may draw previews on.

use crate::classifier::{self, classify, MaskCache, MaskKey};
use crate::codec::MaskFile;
use crate::errors::{EngineError, GridError, PreconditionError, StateWarning};
use crate::grid::{Binning, Grid};
use crate::region::{CutMode, CutRegion, Line, Point};
use crate::registry::GridRegistry;
use crate::store::{AngledPhase, EntryPhase, PointOutcome, RegionStore, UndoOutcome};
use crate::surface::{DisplaySurface, Preview, PreviewLine, PreviewStyle};
use log::{debug, info, trace, warn};
use ndarray::Array2;
use std::fs;
use std::path::{Path, PathBuf};

/// Input delivered by the host, already converted to data coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CutEvent {
    PointerMotion { x: f64, y: f64 },
    PointerPress { x: f64, y: f64 },
    KeyPress(char),
}

/// What a handled event did, for the host's status line.
#[derive(Clone, Debug, PartialEq)]
pub enum EventOutcome {
    Ignored,
    Previewed,
    PointRecorded,
    RegionAdded(CutRegion),
    Undone(UndoOutcome),
    Warning(StateWarning),
    ModeChanged(Option<CutMode>),
    GridSwitched(usize),
    ViewReset,
    MaskSaved(PathBuf),
}

#[derive(Debug, Default)]
pub struct CutEngine {
    registry: GridRegistry,
    store: RegionStore,
    current_mode: Option<CutMode>,
    current_grid: usize,
    output_path: Option<PathBuf>,
    file_mask: Option<Array2<bool>>,
    file_mask_generation: u64,
    cache: MaskCache,
}

impl CutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a grid to the session. Every grid must share the binning of the first one.
    pub fn register(&mut self, grid: &Grid) -> Result<usize, EngineError> {
        let index = self.registry.register(grid)?;
        if index == 0 {
            self.cache.invalidate();
        }
        Ok(index)
    }

    /// Sets the file the mask is saved to. An existing file is copied to
    /// `<path>.backup` first unless `overwrite` is set.
    pub fn set_output_path(
        &mut self,
        path: impl Into<PathBuf>,
        overwrite: bool,
    ) -> Result<(), EngineError> {
        let path = path.into();
        if path.exists() && !overwrite {
            let backup = backup_path(&path);
            warn!(
                "File {} already exists, a backup is written to {}",
                path.display(),
                backup.display()
            );
            fs::copy(&path, &backup).map_err(|source| EngineError::Backup {
                path: path.clone(),
                source,
            })?;
        }
        info!("Cuts will be saved in {}", path.display());
        self.output_path = Some(path);
        Ok(())
    }

    /// Loads previously saved cuts. They are unioned with every region entered afterwards.
    pub fn load_mask(&mut self, path: &Path) -> Result<(), EngineError> {
        let binning = self.registry.binning().ok_or(PreconditionError::NoGrid)?;
        let mask_file = MaskFile::try_from_file(path, binning)?;
        if self.file_mask.is_some() {
            warn!(
                "A mask was already loaded, replacing it with {}",
                path.display()
            );
        }
        self.file_mask = Some(mask_file.into_mask());
        self.file_mask_generation += 1;
        info!("Loaded cuts from {}", path.display());
        Ok(())
    }

    /// Fails unless a grid is registered and the output path is set.
    pub fn ensure_ready(&self) -> Result<(), EngineError> {
        if self.registry.is_empty() {
            return Err(PreconditionError::NoGrid.into());
        }
        if self.output_path.is_none() {
            return Err(PreconditionError::NoOutputPath.into());
        }
        Ok(())
    }

    pub fn handle_event(
        &mut self,
        event: CutEvent,
        surface: &mut dyn DisplaySurface,
    ) -> Result<EventOutcome, EngineError> {
        self.ensure_ready()?;
        trace!("Handling {:?}", event);
        match event {
            CutEvent::PointerMotion { x, y } => Ok(self.on_motion(Point::new(x, y), surface)),
            CutEvent::PointerPress { x, y } => self.on_press(Point::new(x, y), surface),
            CutEvent::KeyPress(key) => self.on_key(key, surface),
        }
    }

    fn on_motion(&mut self, pointer: Point, surface: &mut dyn DisplaySurface) -> EventOutcome {
        let Some(mode) = self.current_mode else {
            return EventOutcome::Ignored;
        };
        match self.preview(mode, pointer) {
            Some(preview) => {
                surface.show_preview(Some(preview));
                EventOutcome::Previewed
            }
            None => EventOutcome::Ignored,
        }
    }

    fn on_press(
        &mut self,
        point: Point,
        surface: &mut dyn DisplaySurface,
    ) -> Result<EventOutcome, EngineError> {
        let Some(mode) = self.current_mode else {
            debug!("No cut mode selected, ignoring press at ({}, {})", point.x, point.y);
            return Ok(EventOutcome::Ignored);
        };
        let binning = self.registry.binning().ok_or(PreconditionError::NoGrid)?;
        match self.store.begin_or_complete_point(mode, point, binning) {
            PointOutcome::Pending => {
                surface.show_preview(self.preview(mode, point));
                Ok(EventOutcome::PointRecorded)
            }
            PointOutcome::Completed(region) => {
                surface.show_preview(None);
                self.report_data_lost()?;
                surface.refresh(self.current_grid);
                Ok(EventOutcome::RegionAdded(region))
            }
            PointOutcome::Rejected(warning) => {
                warn!("{}", warning);
                Ok(EventOutcome::Warning(warning))
            }
        }
    }

    fn on_key(
        &mut self,
        key: char,
        surface: &mut dyn DisplaySurface,
    ) -> Result<EventOutcome, EngineError> {
        match key {
            '0'..='6' => {
                self.current_mode = CutMode::from_key(key);
                surface.show_preview(None);
                match self.current_mode {
                    Some(mode) => info!("Cut mode: {}", mode),
                    None => info!("Cut mode disabled"),
                }
                Ok(EventOutcome::ModeChanged(self.current_mode))
            }
            'u' => self.undo(surface),
            's' => Ok(self.switch_grid(surface)),
            'r' => {
                surface.reset_view();
                Ok(EventOutcome::ViewReset)
            }
            'p' => self.save_mask().map(EventOutcome::MaskSaved),
            _ => {
                trace!("Ignoring key {:?}", key);
                Ok(EventOutcome::Ignored)
            }
        }
    }

    fn undo(&mut self, surface: &mut dyn DisplaySurface) -> Result<EventOutcome, EngineError> {
        let Some(mode) = self.current_mode else {
            warn!("{}", StateWarning::NoActiveMode);
            return Ok(EventOutcome::Warning(StateWarning::NoActiveMode));
        };
        match self.store.undo(mode) {
            Ok(outcome) => {
                surface.show_preview(None);
                if let UndoOutcome::RemovedRegion(_) = outcome {
                    self.report_data_lost()?;
                    surface.refresh(self.current_grid);
                }
                Ok(EventOutcome::Undone(outcome))
            }
            Err(warning) => {
                warn!("{}", warning);
                Ok(EventOutcome::Warning(warning))
            }
        }
    }

    fn switch_grid(&mut self, surface: &mut dyn DisplaySurface) -> EventOutcome {
        if self.registry.len() < 2 {
            warn!("{}", StateWarning::SingleGrid);
            return EventOutcome::Warning(StateWarning::SingleGrid);
        }
        self.current_grid = (self.current_grid + 1) % self.registry.len();
        if let Some(grid) = self.registry.get(self.current_grid) {
            info!("Displaying grid \"{}\"", grid.name());
        }
        surface.refresh(self.current_grid);
        EventOutcome::GridSwitched(self.current_grid)
    }

    /// Outline of the region partially entered in `mode`, ending at `pointer`.
    fn preview(&self, mode: CutMode, pointer: Point) -> Option<Preview> {
        let confirmed = |line| PreviewLine {
            line,
            style: PreviewStyle::Confirmed,
        };
        let active = |line| PreviewLine {
            line,
            style: PreviewStyle::Active,
        };
        if mode == CutMode::AngledBand {
            return match self.store.angled_phase() {
                AngledPhase::FirstLineStart => None,
                AngledPhase::FirstLineEnd { start } => {
                    Line::through(start, pointer).map(|line| Preview::Lines(vec![active(line)]))
                }
                AngledPhase::SecondLineStart { first } => Some(Preview::Lines(vec![confirmed(first)])),
                AngledPhase::SecondLineEnd { first, start } => {
                    let mut lines = vec![confirmed(first)];
                    lines.extend(Line::through(start, pointer).map(active));
                    Some(Preview::Lines(lines))
                }
            };
        }
        let EntryPhase::AwaitingSecondPoint(from) = self.store.phase(mode)? else {
            return None;
        };
        match mode {
            CutMode::BandX => Some(Preview::VerticalLines {
                x1: from.x,
                x2: pointer.x,
            }),
            CutMode::BandY => Some(Preview::HorizontalLines {
                y1: from.y,
                y2: pointer.y,
            }),
            _ => Some(Preview::Rectangle { from, to: pointer }),
        }
    }

    /// The current cut mask, shape `(y_bins, x_bins)`. Recomputed only when
    /// the regions or the loaded mask changed.
    pub fn mask(&mut self) -> Result<&Array2<bool>, EngineError> {
        let binning = self.registry.binning().ok_or(PreconditionError::NoGrid)?;
        let key = MaskKey {
            store_revision: self.store.revision(),
            file_mask_generation: self.file_mask_generation,
        };
        let store = &self.store;
        let file_mask = self.file_mask.as_ref();
        Ok(self
            .cache
            .get_or_compute(key, || classify(binning, store, file_mask)))
    }

    /// Whether bin `(bin_x, bin_y)` of the grid at `grid_index` is cut.
    pub fn is_cut(&self, grid_index: usize, bin_x: usize, bin_y: usize) -> Result<bool, EngineError> {
        let binning = self.registry.binning().ok_or(PreconditionError::NoGrid)?;
        if grid_index >= self.registry.len() {
            return Err(EngineError::GridIndexOutOfRange(
                grid_index,
                self.registry.len(),
            ));
        }
        if bin_x >= binning.x.nbins() || bin_y >= binning.y.nbins() {
            return Err(GridError::BinOutOfRange(bin_x, bin_y).into());
        }
        Ok(classifier::is_cut(
            &binning.bin_geometry(bin_x, bin_y),
            &self.store,
            self.file_mask.as_ref(),
        ))
    }

    /// Zeroes every cut bin of `grid`, returning how many bins were cut.
    pub fn apply_cuts(&mut self, grid: &mut Grid) -> Result<usize, EngineError> {
        let binning = self.registry.binning().ok_or(PreconditionError::NoGrid)?;
        if let Some(mismatch) = binning.mismatch(grid.binning()) {
            return Err(EngineError::Binning {
                name: grid.name().to_string(),
                mismatch,
            });
        }
        let mask = self.mask()?;
        let mut cut = 0;
        for ((iy, ix), _) in mask.indexed_iter().filter(|(_, &flag)| flag) {
            grid.set_bin_content(ix, iy, 0.0)?;
            cut += 1;
        }
        debug!("Zeroed {} bins of \"{}\"", cut, grid.name());
        Ok(cut)
    }

    /// Copy of a registered grid with the cuts applied.
    pub fn masked_grid(&mut self, index: usize) -> Result<Grid, EngineError> {
        let mut grid = self
            .registry
            .get(index)
            .cloned()
            .ok_or(EngineError::GridIndexOutOfRange(index, self.registry.len()))?;
        self.apply_cuts(&mut grid)?;
        Ok(grid)
    }

    /// Share of the registered integral of grid `index` removed by the cuts.
    pub fn data_lost_fraction(&mut self, index: usize) -> Result<f64, EngineError> {
        let baseline = self
            .registry
            .baseline_integral(index)
            .ok_or(EngineError::GridIndexOutOfRange(index, self.registry.len()))?;
        let kept = self.masked_grid(index)?.integral();
        Ok(1.0 - kept / baseline)
    }

    fn report_data_lost(&mut self) -> Result<(), EngineError> {
        let lost = self.data_lost_fraction(self.current_grid)?;
        if let Some(grid) = self.registry.get(self.current_grid) {
            info!("Data lost in \"{}\": {:.2}%", grid.name(), 100.0 * lost);
        }
        Ok(())
    }

    /// Writes the current mask to the output path.
    pub fn save_mask(&mut self) -> Result<PathBuf, EngineError> {
        self.ensure_ready()?;
        let path = self
            .output_path
            .clone()
            .ok_or(PreconditionError::NoOutputPath)?;
        let binning = self
            .registry
            .binning()
            .cloned()
            .ok_or(PreconditionError::NoGrid)?;
        let mask = self.mask()?.clone();
        MaskFile::new(binning, mask).write_to_file(&path)?;
        Ok(path)
    }

    pub fn registry(&self) -> &GridRegistry {
        &self.registry
    }

    pub fn store(&self) -> &RegionStore {
        &self.store
    }

    pub fn binning(&self) -> Option<&Binning> {
        self.registry.binning()
    }

    pub fn current_mode(&self) -> Option<CutMode> {
        self.current_mode
    }

    pub fn current_grid(&self) -> usize {
        self.current_grid
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub fn has_file_mask(&self) -> bool {
        self.file_mask.is_some()
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".backup");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MaskCodecError;
    use crate::grid::tests::unit_binning;
    use crate::grid::{Axis, AxisName};

    #[derive(Default)]
    struct RecordingSurface {
        previews: Vec<Option<Preview>>,
        refreshed: Vec<usize>,
        resets: usize,
    }

    impl DisplaySurface for RecordingSurface {
        fn show_preview(&mut self, preview: Option<Preview>) {
            self.previews.push(preview);
        }

        fn refresh(&mut self, grid_index: usize) {
            self.refreshed.push(grid_index);
        }

        fn reset_view(&mut self) {
            self.resets += 1;
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gridcut-{}-{}", std::process::id(), name))
    }

    fn ones(name: &str, nx: usize, ny: usize) -> Grid {
        let binning = unit_binning(nx, ny);
        let content = Array2::from_elem(binning.shape(), 1.0);
        Grid::from_content(name, binning, content).unwrap()
    }

    fn ready_engine(output: &str) -> CutEngine {
        let mut engine = CutEngine::new();
        engine.register(&ones("signal", 4, 4)).unwrap();
        engine.set_output_path(temp_path(output), true).unwrap();
        engine
    }

    fn send(engine: &mut CutEngine, surface: &mut RecordingSurface, event: CutEvent) -> EventOutcome {
        engine.handle_event(event, surface).unwrap()
    }

    fn press(engine: &mut CutEngine, surface: &mut RecordingSurface, x: f64, y: f64) -> EventOutcome {
        send(engine, surface, CutEvent::PointerPress { x, y })
    }

    fn key(engine: &mut CutEngine, surface: &mut RecordingSurface, key: char) -> EventOutcome {
        send(engine, surface, CutEvent::KeyPress(key))
    }

    #[test]
    fn test_events_require_grid_and_output() {
        let mut surface = RecordingSurface::default();
        let mut engine = CutEngine::new();
        assert!(matches!(
            engine.handle_event(CutEvent::KeyPress('1'), &mut surface),
            Err(EngineError::Precondition(PreconditionError::NoGrid))
        ));
        assert!(matches!(
            engine.load_mask(&temp_path("never-written.mask")),
            Err(EngineError::Precondition(PreconditionError::NoGrid))
        ));

        engine.register(&ones("signal", 4, 4)).unwrap();
        assert!(matches!(
            engine.handle_event(CutEvent::PointerPress { x: 1.0, y: 1.0 }, &mut surface),
            Err(EngineError::Precondition(PreconditionError::NoOutputPath))
        ));
        assert!(engine.store().is_empty());
    }

    #[test]
    fn test_rectangle_scenario_save_and_reload() {
        let output = "rectangle.mask";
        let mut surface = RecordingSurface::default();
        let mut engine = ready_engine(output);

        assert_eq!(
            key(&mut engine, &mut surface, '1'),
            EventOutcome::ModeChanged(Some(CutMode::Rectangle))
        );
        assert_eq!(press(&mut engine, &mut surface, 1.0, 1.0), EventOutcome::PointRecorded);
        assert!(matches!(
            press(&mut engine, &mut surface, 3.0, 3.0),
            EventOutcome::RegionAdded(CutRegion::Rectangle { .. })
        ));
        assert_eq!(surface.refreshed, vec![0]);

        assert!(engine.is_cut(0, 1, 1).unwrap());
        assert!(engine.is_cut(0, 2, 2).unwrap());
        assert!(!engine.is_cut(0, 0, 0).unwrap());

        let path = match key(&mut engine, &mut surface, 'p') {
            EventOutcome::MaskSaved(path) => path,
            other => panic!("unexpected outcome {:?}", other),
        };
        let saved = engine.mask().unwrap().clone();

        let mut reloaded = CutEngine::new();
        reloaded.register(&ones("signal", 4, 4)).unwrap();
        reloaded.load_mask(&path).unwrap();
        assert_eq!(reloaded.mask().unwrap(), &saved);

        let mut wider = CutEngine::new();
        wider.register(&ones("wider", 5, 4)).unwrap();
        assert!(matches!(
            wider.load_mask(&path),
            Err(EngineError::Codec(MaskCodecError::SchemaMismatch { .. }))
        ));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_single_bin_then_undo() {
        let mut surface = RecordingSurface::default();
        let mut engine = ready_engine("single-bin.mask");
        let untouched = engine.mask().unwrap().clone();

        key(&mut engine, &mut surface, '6');
        press(&mut engine, &mut surface, 0.2, 0.2);
        let mask = engine.mask().unwrap();
        assert!(mask[[0, 0]]);
        assert_eq!(mask.iter().filter(|&&cut| cut).count(), 1);

        assert!(matches!(
            key(&mut engine, &mut surface, 'u'),
            EventOutcome::Undone(UndoOutcome::RemovedRegion(CutRegion::SingleBin { .. }))
        ));
        assert_eq!(engine.mask().unwrap(), &untouched);
    }

    #[test]
    fn test_undo_on_empty_store_warns() {
        let mut surface = RecordingSurface::default();
        let mut engine = ready_engine("empty-undo.mask");
        assert_eq!(
            key(&mut engine, &mut surface, 'u'),
            EventOutcome::Warning(StateWarning::NoActiveMode)
        );
        key(&mut engine, &mut surface, '3');
        let before = engine.mask().unwrap().clone();
        assert_eq!(
            key(&mut engine, &mut surface, 'u'),
            EventOutcome::Warning(StateWarning::NothingToUndo(CutMode::BandY))
        );
        assert_eq!(engine.mask().unwrap(), &before);
        assert!(surface.refreshed.is_empty());
    }

    #[test]
    fn test_press_without_mode_is_ignored() {
        let mut surface = RecordingSurface::default();
        let mut engine = ready_engine("no-mode.mask");
        assert_eq!(press(&mut engine, &mut surface, 1.5, 1.5), EventOutcome::Ignored);
        key(&mut engine, &mut surface, '2');
        key(&mut engine, &mut surface, '0');
        assert_eq!(engine.current_mode(), None);
        assert_eq!(press(&mut engine, &mut surface, 1.5, 1.5), EventOutcome::Ignored);
        assert!(engine.store().is_empty());
        assert_eq!(key(&mut engine, &mut surface, 'x'), EventOutcome::Ignored);
    }

    #[test]
    fn test_motion_previews_pending_entry() {
        let mut surface = RecordingSurface::default();
        let mut engine = ready_engine("preview.mask");
        key(&mut engine, &mut surface, '2');
        assert_eq!(
            send(&mut engine, &mut surface, CutEvent::PointerMotion { x: 2.0, y: 2.0 }),
            EventOutcome::Ignored
        );
        press(&mut engine, &mut surface, 1.5, 0.5);
        assert_eq!(
            send(&mut engine, &mut surface, CutEvent::PointerMotion { x: 3.2, y: 2.0 }),
            EventOutcome::Previewed
        );
        assert_eq!(
            surface.previews.last(),
            Some(&Some(Preview::VerticalLines { x1: 1.5, x2: 3.2 }))
        );

        // the band x entry survives a detour through the angled band
        key(&mut engine, &mut surface, '5');
        press(&mut engine, &mut surface, 0.5, 0.5);
        press(&mut engine, &mut surface, 2.5, 2.5);
        send(&mut engine, &mut surface, CutEvent::PointerMotion { x: 3.5, y: 3.5 });
        match surface.previews.last() {
            Some(Some(Preview::Lines(lines))) => {
                assert_eq!(lines.len(), 1);
                assert_eq!(lines[0].style, PreviewStyle::Confirmed);
            }
            other => panic!("unexpected preview {:?}", other),
        }
        key(&mut engine, &mut surface, '2');
        assert!(matches!(
            press(&mut engine, &mut surface, 2.5, 0.5),
            EventOutcome::RegionAdded(CutRegion::BandX {
                x_min: 1.0,
                x_max: 3.0
            })
        ));
    }

    #[test]
    fn test_angled_band_vertical_line_warning() {
        let mut surface = RecordingSurface::default();
        let mut engine = ready_engine("vertical.mask");
        key(&mut engine, &mut surface, '5');
        press(&mut engine, &mut surface, 1.2, 0.5);
        assert_eq!(
            press(&mut engine, &mut surface, 1.8, 3.5),
            EventOutcome::Warning(StateWarning::VerticalLine)
        );
        assert!(engine.store().has_pending(CutMode::AngledBand));
    }

    #[test]
    fn test_grid_switching_wraps() {
        let mut surface = RecordingSurface::default();
        let mut engine = ready_engine("switch.mask");
        assert_eq!(
            key(&mut engine, &mut surface, 's'),
            EventOutcome::Warning(StateWarning::SingleGrid)
        );
        engine.register(&ones("background", 4, 4)).unwrap();
        assert_eq!(key(&mut engine, &mut surface, 's'), EventOutcome::GridSwitched(1));
        assert_eq!(key(&mut engine, &mut surface, 's'), EventOutcome::GridSwitched(0));
        assert_eq!(surface.refreshed, vec![1, 0]);
        assert_eq!(key(&mut engine, &mut surface, 'r'), EventOutcome::ViewReset);
        assert_eq!(surface.resets, 1);
    }

    #[test]
    fn test_apply_cuts_and_data_lost() {
        let mut surface = RecordingSurface::default();
        let mut engine = ready_engine("apply.mask");
        key(&mut engine, &mut surface, '3');
        press(&mut engine, &mut surface, 0.0, 0.5);
        press(&mut engine, &mut surface, 0.0, 0.5);

        let masked = engine.masked_grid(0).unwrap();
        assert_eq!(masked.integral(), 12.0);
        assert_eq!(masked.bin_content(2, 0).unwrap(), 0.0);
        assert_eq!(masked.bin_content(2, 1).unwrap(), 1.0);
        assert!((engine.data_lost_fraction(0).unwrap() - 0.25).abs() < 1e-12);

        let mut other = ones("other", 4, 4);
        assert_eq!(engine.apply_cuts(&mut other).unwrap(), 4);
        let mut wrong = ones("wrong", 2, 2);
        assert!(matches!(
            engine.apply_cuts(&mut wrong),
            Err(EngineError::Binning { .. })
        ));
        assert!(matches!(
            engine.masked_grid(3),
            Err(EngineError::GridIndexOutOfRange(3, 1))
        ));
    }

    #[test]
    fn test_loaded_mask_is_unioned_and_replaced() {
        let binning = unit_binning(4, 4);
        let mut first = Array2::from_elem(binning.shape(), false);
        first[[3, 3]] = true;
        let first_path = temp_path("loaded-first.mask");
        MaskFile::new(binning.clone(), first)
            .write_to_file(&first_path)
            .unwrap();
        let mut second = Array2::from_elem(binning.shape(), false);
        second[[0, 3]] = true;
        let second_path = temp_path("loaded-second.mask");
        MaskFile::new(binning, second)
            .write_to_file(&second_path)
            .unwrap();

        let mut surface = RecordingSurface::default();
        let mut engine = ready_engine("loaded.mask");
        engine.load_mask(&first_path).unwrap();
        key(&mut engine, &mut surface, '6');
        press(&mut engine, &mut surface, 0.5, 0.5);
        assert!(engine.is_cut(0, 3, 3).unwrap());
        assert!(engine.is_cut(0, 0, 0).unwrap());

        engine.load_mask(&second_path).unwrap();
        assert!(!engine.is_cut(0, 3, 3).unwrap());
        assert!(engine.is_cut(0, 3, 0).unwrap());
        assert_eq!(engine.mask().unwrap().iter().filter(|&&cut| cut).count(), 2);

        fs::remove_file(first_path).unwrap();
        fs::remove_file(second_path).unwrap();
    }

    #[test]
    fn test_existing_output_is_backed_up() {
        let path = temp_path("backup.mask");
        fs::write(&path, "previous cuts").unwrap();
        let mut engine = CutEngine::new();
        engine.register(&ones("signal", 2, 2)).unwrap();
        engine.set_output_path(&path, false).unwrap();

        let backup = backup_path(&path);
        assert_eq!(fs::read_to_string(&backup).unwrap(), "previous cuts");
        assert_eq!(engine.save_mask().unwrap(), path);
        assert_eq!(fs::read_to_string(&path).unwrap(), "2 0 2 2 0 2\n0 0\n0 0");

        fs::remove_file(path).unwrap();
        fs::remove_file(backup).unwrap();
    }

    #[test]
    fn test_is_cut_rejects_bad_indices() {
        let engine = ready_engine("indices.mask");
        assert!(matches!(
            engine.is_cut(1, 0, 0),
            Err(EngineError::GridIndexOutOfRange(1, 1))
        ));
        assert!(matches!(
            engine.is_cut(0, 4, 0),
            Err(EngineError::Grid(GridError::BinOutOfRange(4, 0)))
        ));
    }

    #[test]
    fn test_point_on_bin_edge_lands_in_one_bin() {
        let binning = Binning::new(
            Axis::new(AxisName::X, 10, 0.0, 1.0).unwrap(),
            Axis::new(AxisName::Y, 1, 0.0, 1.0).unwrap(),
        );
        let content = Array2::from_elem(binning.shape(), 1.0);
        let expected = binning.x.find_bin(0.3).unwrap();

        let cut_bins = |mode: char, presses: usize| {
            let mut surface = RecordingSurface::default();
            let mut engine = CutEngine::new();
            engine
                .register(&Grid::from_content("tenths", binning.clone(), content.clone()).unwrap())
                .unwrap();
            engine
                .set_output_path(temp_path("edge.mask"), true)
                .unwrap();
            key(&mut engine, &mut surface, mode);
            for _ in 0..presses {
                press(&mut engine, &mut surface, 0.3, 0.5);
            }
            let mask = engine.mask().unwrap();
            (0..10).filter(|&ix| mask[[0, ix]]).collect::<Vec<_>>()
        };

        assert_eq!(cut_bins('6', 1), vec![expected]);
        assert_eq!(cut_bins('2', 2), vec![expected]);
    }
}
