use pretty_env_logger;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn _setup_pretty_env_logger_default() {
    INIT.call_once(|| {
        pretty_env_logger::init();
    });
}

pub use codec::MaskFile;
pub use engine::{CutEngine, CutEvent, EventOutcome};
pub use errors::{
    BinningMismatch, EngineError, GridError, MaskCodecError, PreconditionError, RegistryError,
    StateWarning,
};
pub use grid::{Axis, AxisName, BinGeometry, Binning, Grid};
pub use region::{CutMode, CutRegion, Line, Point};
pub use registry::GridRegistry;
pub use store::RegionStore;
pub use surface::{DisplaySurface, Preview, PreviewLine, PreviewStyle};
pub mod classifier;
pub mod codec;
pub mod engine;
pub mod errors;
pub mod grid;
pub mod region;
pub mod registry;
pub mod store;
pub mod surface;
pub mod tui;
