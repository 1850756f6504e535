// gridcut/src/codec.rs
//! Plain-text mask files.
//!
//! ```text
//! <x_bins> <x_low> <x_high> <y_bins> <y_low> <y_high>
//! <b(0,0)> <b(1,0)> ... <b(x_bins-1,0)>
//! ...
//! <b(0,y_bins-1)> ... <b(x_bins-1,y_bins-1)>
//! ```
//!
//! One row per Y bin (lowest first), `1` marks a cut bin.

use crate::errors::MaskCodecError;
use crate::grid::{Axis, AxisName, Binning};
use log::{debug, info};
use ndarray::Array2;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// A mask together with the binning it was computed for.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskFile {
    binning: Binning,
    mask: Array2<bool>,
}

impl MaskFile {
    /// `mask` must have shape `binning.shape()`.
    pub fn new(binning: Binning, mask: Array2<bool>) -> Self {
        debug_assert_eq!(mask.dim(), binning.shape());
        Self { binning, mask }
    }

    pub fn binning(&self) -> &Binning {
        &self.binning
    }

    pub fn mask(&self) -> &Array2<bool> {
        &self.mask
    }

    pub fn into_mask(self) -> Array2<bool> {
        self.mask
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "{}", self)?;
        writer.flush()
    }

    pub fn write_to_file(&self, filename: &Path) -> Result<(), MaskCodecError> {
        let io_error = |source| MaskCodecError::Io {
            path: filename.to_path_buf(),
            source,
        };
        let file = File::create(filename).map_err(io_error)?;
        self.write_to(&mut BufWriter::new(file)).map_err(io_error)?;
        info!("Cuts were written in file {}", filename.display());
        Ok(())
    }

    pub fn read_from<R: BufRead>(
        mut reader: R,
        expected: &Binning,
        origin: &Path,
    ) -> Result<Self, MaskCodecError> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|source| MaskCodecError::Io {
                path: origin.to_path_buf(),
                source,
            })?;
        Self::parse(&text, expected, origin)
    }

    /// Reads `filename` and checks its header against `expected`.
    pub fn try_from_file(filename: &Path, expected: &Binning) -> Result<Self, MaskCodecError> {
        let file = File::open(filename).map_err(|source| MaskCodecError::Io {
            path: filename.to_path_buf(),
            source,
        })?;
        let mask_file = Self::read_from(BufReader::new(file), expected, filename)?;
        debug!(
            "Read {} cut bins from {}",
            mask_file.mask.iter().filter(|&&cut| cut).count(),
            filename.display()
        );
        Ok(mask_file)
    }

    /// Parses mask text; `origin` only labels errors.
    pub fn parse(text: &str, expected: &Binning, origin: &Path) -> Result<Self, MaskCodecError> {
        let mut tokens = text.split_whitespace();
        let binning = parse_header(&mut tokens, origin)?;
        if let Some(mismatch) = expected.mismatch(&binning) {
            return Err(MaskCodecError::SchemaMismatch {
                path: origin.to_path_buf(),
                mismatch,
            });
        }

        let total = binning.nbins();
        let mut values = Vec::with_capacity(total);
        for token in tokens.by_ref().take(total) {
            let value = match token {
                "0" => false,
                "1" => true,
                _ => {
                    return Err(MaskCodecError::InvalidToken {
                        path: origin.to_path_buf(),
                        token: token.to_string(),
                        index: values.len(),
                    })
                }
            };
            values.push(value);
        }
        if values.len() < total {
            return Err(MaskCodecError::Truncated {
                path: origin.to_path_buf(),
                expected: total,
                found: values.len(),
            });
        }
        if tokens.next().is_some() {
            return Err(MaskCodecError::TrailingData {
                path: origin.to_path_buf(),
                expected: total,
            });
        }

        let mask = Array2::from_shape_vec(binning.shape(), values).map_err(|e| {
            MaskCodecError::MalformedHeader {
                path: origin.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self { binning, mask })
    }
}

fn parse_header<'a, I>(tokens: &mut I, origin: &Path) -> Result<Binning, MaskCodecError>
where
    I: Iterator<Item = &'a str>,
{
    let malformed = |reason: String| MaskCodecError::MalformedHeader {
        path: origin.to_path_buf(),
        reason,
    };
    let mut next = |what: &str| {
        tokens
            .next()
            .ok_or_else(|| malformed(format!("unexpected end of file while reading {}", what)))
    };
    let mut axis = |name: AxisName| -> Result<Axis, MaskCodecError> {
        let nbins_token = next("the number of bins")?;
        let nbins = nbins_token
            .parse::<usize>()
            .map_err(|_| malformed(format!("\"{}\" is not a bin count", nbins_token)))?;
        let mut edge = |what: &str| -> Result<f64, MaskCodecError> {
            let token = next(what)?;
            token
                .parse::<f64>()
                .map_err(|_| malformed(format!("\"{}\" is not an axis edge", token)))
        };
        let low = edge("the lower axis edge")?;
        let high = edge("the upper axis edge")?;
        Axis::new(name, nbins, low, high).map_err(|e| malformed(e.to_string()))
    };
    let x = axis(AxisName::X)?;
    let y = axis(AxisName::Y)?;
    Ok(Binning::new(x, y))
}

impl fmt::Display for MaskFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = &self.binning.x;
        let y = &self.binning.y;
        writeln!(
            f,
            "{} {} {} {} {} {}",
            x.nbins(),
            x.low(),
            x.high(),
            y.nbins(),
            y.low(),
            y.high()
        )?;
        let rows = self.mask.nrows();
        for (iy, row) in self.mask.rows().into_iter().enumerate() {
            let line = row
                .iter()
                .map(|&cut| if cut { "1" } else { "0" })
                .collect::<Vec<_>>()
                .join(" ");
            write!(f, "{}", line)?;
            if iy + 1 < rows {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
