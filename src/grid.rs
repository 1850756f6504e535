// gridcut/src/grid.rs

use crate::errors::{BinningMismatch, GridError};
use log::debug;
use ndarray::Array2;
use std::fmt;
use std::fs::File;
use std::path::PathBuf;

/// Absolute tolerance used when comparing axis edges.
pub const EDGE_TOLERANCE: f64 = 1e-15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisName {
    X,
    Y,
}

impl fmt::Display for AxisName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisName::X => write!(f, "X"),
            AxisName::Y => write!(f, "Y"),
        }
    }
}

/// A uniformly binned axis covering `[low, high)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    nbins: usize,
    low: f64,
    high: f64,
}

impl Axis {
    pub fn new(name: AxisName, nbins: usize, low: f64, high: f64) -> Result<Self, GridError> {
        if nbins == 0 {
            return Err(GridError::EmptyAxis(name));
        }
        if !low.is_finite() || !high.is_finite() || high <= low {
            return Err(GridError::InvalidAxisRange(name, low, high));
        }
        Ok(Self { nbins, low, high })
    }

    pub fn nbins(&self) -> usize {
        self.nbins
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn bin_width(&self) -> f64 {
        (self.high - self.low) / self.nbins as f64
    }

    pub fn low_edge(&self, bin: usize) -> f64 {
        self.low + bin as f64 * self.bin_width()
    }

    pub fn up_edge(&self, bin: usize) -> f64 {
        if bin + 1 >= self.nbins {
            self.high
        } else {
            self.low_edge(bin + 1)
        }
    }

    pub fn center(&self, bin: usize) -> f64 {
        0.5 * (self.low_edge(bin) + self.up_edge(bin))
    }

    /// Index of the bin containing `value`, `None` outside of `[low, high)`.
    ///
    /// The result always satisfies `low_edge(bin) <= value < up_edge(bin)`.
    pub fn find_bin(&self, value: f64) -> Option<usize> {
        if !(value >= self.low && value < self.high) {
            return None;
        }
        let bin = (self.nbins as f64 * (value - self.low) / (self.high - self.low)) as usize;
        let mut bin = bin.min(self.nbins - 1);
        // the division can round across an edge
        while bin > 0 && value < self.low_edge(bin) {
            bin -= 1;
        }
        while bin + 1 < self.nbins && value >= self.up_edge(bin) {
            bin += 1;
        }
        Some(bin)
    }

    /// Like [`Axis::find_bin`], but values outside the axis land in the first or last bin.
    pub fn clamp_bin(&self, value: f64) -> usize {
        match self.find_bin(value) {
            Some(bin) => bin,
            None if value < self.low || value.is_nan() => 0,
            None => self.nbins - 1,
        }
    }

    fn mismatch(&self, other: &Axis, name: AxisName) -> Option<BinningMismatch> {
        if self.nbins != other.nbins {
            return Some(BinningMismatch::Bins {
                axis: name,
                expected: self.nbins,
                found: other.nbins,
            });
        }
        if (self.low - other.low).abs() > EDGE_TOLERANCE
            || (self.high - other.high).abs() > EDGE_TOLERANCE
        {
            return Some(BinningMismatch::Range {
                axis: name,
                expected: (self.low, self.high),
                found: (other.low, other.high),
            });
        }
        None
    }
}

/// Geometric extent of a single bin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BinGeometry {
    pub ix: usize,
    pub iy: usize,
    pub center_x: f64,
    pub center_y: f64,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// The X and Y axes shared by every grid a mask applies to.
#[derive(Clone, Debug, PartialEq)]
pub struct Binning {
    pub x: Axis,
    pub y: Axis,
}

impl Binning {
    pub fn new(x: Axis, y: Axis) -> Self {
        Self { x, y }
    }

    /// Mask/content shape, rows are Y bins.
    pub fn shape(&self) -> (usize, usize) {
        (self.y.nbins(), self.x.nbins())
    }

    pub fn nbins(&self) -> usize {
        self.x.nbins() * self.y.nbins()
    }

    pub fn bin_geometry(&self, ix: usize, iy: usize) -> BinGeometry {
        BinGeometry {
            ix,
            iy,
            center_x: self.x.center(ix),
            center_y: self.y.center(iy),
            x_min: self.x.low_edge(ix),
            x_max: self.x.up_edge(ix),
            y_min: self.y.low_edge(iy),
            y_max: self.y.up_edge(iy),
        }
    }

    /// First difference found against `other`: bin counts before ranges, X before Y.
    pub fn mismatch(&self, other: &Binning) -> Option<BinningMismatch> {
        if self.x.nbins() != other.x.nbins() {
            return self.x.mismatch(&other.x, AxisName::X);
        }
        if self.y.nbins() != other.y.nbins() {
            return self.y.mismatch(&other.y, AxisName::Y);
        }
        self.x
            .mismatch(&other.x, AxisName::X)
            .or_else(|| self.y.mismatch(&other.y, AxisName::Y))
    }
}

impl fmt::Display for Binning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x [{}, {}) by {} y [{}, {})",
            self.x.nbins(),
            self.x.low(),
            self.x.high(),
            self.y.nbins(),
            self.y.low(),
            self.y.high()
        )
    }
}

/// A named two-dimensional binned distribution.
#[derive(Clone, Debug)]
pub struct Grid {
    name: String,
    binning: Binning,
    content: Array2<f64>,
}

impl Grid {
    pub fn new(name: impl Into<String>, binning: Binning) -> Self {
        let content = Array2::zeros(binning.shape());
        Self {
            name: name.into(),
            binning,
            content,
        }
    }

    pub fn from_content(
        name: impl Into<String>,
        binning: Binning,
        content: Array2<f64>,
    ) -> Result<Self, GridError> {
        if content.dim() != binning.shape() {
            return Err(GridError::ShapeMismatch {
                expected: binning.shape(),
                found: content.dim(),
            });
        }
        Ok(Self {
            name: name.into(),
            binning,
            content,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binning(&self) -> &Binning {
        &self.binning
    }

    pub fn content(&self) -> &Array2<f64> {
        &self.content
    }

    pub fn bin_content(&self, ix: usize, iy: usize) -> Result<f64, GridError> {
        self.content
            .get([iy, ix])
            .copied()
            .ok_or(GridError::BinOutOfRange(ix, iy))
    }

    pub fn set_bin_content(&mut self, ix: usize, iy: usize, value: f64) -> Result<(), GridError> {
        let cell = self
            .content
            .get_mut([iy, ix])
            .ok_or(GridError::BinOutOfRange(ix, iy))?;
        *cell = value;
        Ok(())
    }

    pub fn integral(&self) -> f64 {
        self.content.sum()
    }

    /// Writes the grid in the same CSV layout [`Grid::try_from`] reads.
    pub fn write_to_file(&self, filename: &PathBuf) -> Result<(), GridError> {
        let csv_err = |source| GridError::Csv {
            path: filename.clone(),
            source,
        };
        let file = File::create(filename).map_err(|source| GridError::Io {
            path: filename.clone(),
            source,
        })?;
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_writer(file);
        let x = &self.binning.x;
        let y = &self.binning.y;
        writer
            .write_record([
                x.nbins().to_string(),
                x.low().to_string(),
                x.high().to_string(),
                y.nbins().to_string(),
                y.low().to_string(),
                y.high().to_string(),
            ])
            .map_err(csv_err)?;
        for row in self.content.rows() {
            writer
                .write_record(row.iter().map(|value| value.to_string()))
                .map_err(csv_err)?;
        }
        writer.flush().map_err(|source| GridError::Io {
            path: filename.clone(),
            source,
        })?;
        Ok(())
    }
}

/// Reads a grid from CSV: an axis record
/// `x_bins,x_min,x_max,y_bins,y_min,y_max` followed by one record of
/// `x_bins` contents per Y bin, lowest Y first. Lines starting with `#` are
/// skipped. The grid is named after the file stem.
impl TryFrom<&PathBuf> for Grid {
    type Error = GridError;

    fn try_from(path: &PathBuf) -> Result<Self, Self::Error> {
        let invalid = |reason: String| GridError::InvalidFormat {
            path: path.clone(),
            reason,
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|source| GridError::Csv {
                path: path.clone(),
                source,
            })?;
        let mut records = reader.records();

        let header = records
            .next()
            .ok_or_else(|| invalid("missing axis record".to_string()))?
            .map_err(|source| GridError::Csv {
                path: path.clone(),
                source,
            })?;
        if header.len() != 6 {
            return Err(invalid(format!(
                "axis record must have 6 fields, found {}",
                header.len()
            )));
        }
        let parse_count = |field: &str| {
            field
                .parse::<usize>()
                .map_err(|_| invalid(format!("\"{}\" is not a bin count", field)))
        };
        let parse_edge = |field: &str| {
            field
                .parse::<f64>()
                .map_err(|_| invalid(format!("\"{}\" is not an axis edge", field)))
        };
        let x = Axis::new(
            AxisName::X,
            parse_count(&header[0])?,
            parse_edge(&header[1])?,
            parse_edge(&header[2])?,
        )?;
        let y = Axis::new(
            AxisName::Y,
            parse_count(&header[3])?,
            parse_edge(&header[4])?,
            parse_edge(&header[5])?,
        )?;
        let binning = Binning::new(x, y);
        let (ny, nx) = binning.shape();

        let mut values = Vec::with_capacity(ny * nx);
        for (row, record) in records.enumerate() {
            let record = record.map_err(|source| GridError::Csv {
                path: path.clone(),
                source,
            })?;
            if row >= ny {
                return Err(invalid(format!("expected {} rows of contents, found more", ny)));
            }
            if record.len() != nx {
                return Err(invalid(format!(
                    "row {} has {} values, expected {}",
                    row,
                    record.len(),
                    nx
                )));
            }
            for field in record.iter() {
                let value = field
                    .parse::<f64>()
                    .map_err(|_| invalid(format!("\"{}\" in row {} is not a number", field, row)))?;
                values.push(value);
            }
        }
        if values.len() != ny * nx {
            return Err(invalid(format!(
                "expected {} rows of contents, found {}",
                ny,
                values.len() / nx
            )));
        }
        let content = Array2::from_shape_vec((ny, nx), values).map_err(|e| invalid(e.to_string()))?;

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        debug!("Read grid \"{}\" ({}) from {}", name, binning, path.display());
        Grid::from_content(name, binning, content)
    }
}
