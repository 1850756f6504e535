// gridcut/src/errors.rs

use crate::grid::AxisName;
use crate::region::CutMode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BinningMismatch {
    #[error("number of bins of {axis} axis differs: expected {expected}, found {found}")]
    Bins {
        axis: AxisName,
        expected: usize,
        found: usize,
    },
    #[error(
        "{axis} axis range differs: expected [{}, {}], found [{}, {}]",
        .expected.0, .expected.1, .found.0, .found.1
    )]
    Range {
        axis: AxisName,
        expected: (f64, f64),
        found: (f64, f64),
    },
}

#[derive(Error, Debug)]
pub enum GridError {
    #[error("{0} axis must have at least one bin")]
    EmptyAxis(AxisName),
    #[error("{0} axis range must be finite and increasing, but got [{1}, {2}]")]
    InvalidAxisRange(AxisName, f64, f64),
    #[error("Content shape {found:?} does not match binning {expected:?} (y_bins, x_bins)")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("Bin ({0}, {1}) is outside of the grid")]
    BinOutOfRange(usize, usize),
    #[error("File IO error on \"{}\": {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("CSV error on \"{}\": {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("Invalid grid file \"{}\": {reason}", .path.display())]
    InvalidFormat { path: PathBuf, reason: String },
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Grid \"{0}\" is empty")]
    EmptyGrid(String),
    #[error("Grid \"{name}\" is inconsistent with previously registered grid(s): {mismatch}")]
    Inconsistent {
        name: String,
        mismatch: BinningMismatch,
    },
}

#[derive(Error, Debug)]
pub enum MaskCodecError {
    #[error("File IO error on \"{}\": {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid axis header in \"{}\": {reason}", .path.display())]
    MalformedHeader { path: PathBuf, reason: String },
    #[error("Mask file \"{}\" does not match the registered grid(s): {mismatch}", .path.display())]
    SchemaMismatch {
        path: PathBuf,
        mismatch: BinningMismatch,
    },
    #[error("Invalid value \"{token}\" for bin #{index} in \"{}\" (expected 0 or 1)", .path.display())]
    InvalidToken {
        path: PathBuf,
        token: String,
        index: usize,
    },
    #[error("Unexpected end of file \"{}\": expected {expected} bin values, found {found}", .path.display())]
    Truncated {
        path: PathBuf,
        expected: usize,
        found: usize,
    },
    #[error("Leftover data detected in \"{}\" after {expected} bin values", .path.display())]
    TrailingData { path: PathBuf, expected: usize },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("No grids were registered; register at least one grid first")]
    NoGrid,
    #[error("Output file was not set; set it before handling events")]
    NoOutputPath,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Codec(#[from] MaskCodecError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("Grid \"{name}\" cannot be masked: {mismatch}")]
    Binning {
        name: String,
        mismatch: BinningMismatch,
    },
    #[error("Grid index {0} is out of range ({1} grid(s) registered)")]
    GridIndexOutOfRange(usize, usize),
    #[error("Failed to back up \"{}\": {source}", .path.display())]
    Backup {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Non-fatal conditions: logged, state unchanged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateWarning {
    #[error("Nothing to undo in {0} mode")]
    NothingToUndo(CutMode),
    #[error("Only one grid is registered; nothing to switch to")]
    SingleGrid,
    #[error("No cut mode is active; press 1-6 to select one")]
    NoActiveMode,
    #[error("Both points of the line fall into the same x bin; pick another point")]
    VerticalLine,
}
