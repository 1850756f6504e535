// gridcut/src/registry.rs

use crate::errors::RegistryError;
use crate::grid::{Binning, Grid};
use log::{debug, info};

/// Grids whose integral is below this are considered empty.
const EMPTY_INTEGRAL: f64 = 1e-15;

/// Grids sharing one binning. Holds its own copies.
#[derive(Clone, Debug, Default)]
pub struct GridRegistry {
    grids: Vec<Grid>,
    baseline_integrals: Vec<f64>,
}

impl GridRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a copy of `grid`, returning its index.
    pub fn register(&mut self, grid: &Grid) -> Result<usize, RegistryError> {
        let integral = grid.integral();
        if integral.abs() < EMPTY_INTEGRAL {
            return Err(RegistryError::EmptyGrid(grid.name().to_string()));
        }
        if let Some(reference) = self.binning() {
            if let Some(mismatch) = reference.mismatch(grid.binning()) {
                return Err(RegistryError::Inconsistent {
                    name: grid.name().to_string(),
                    mismatch,
                });
            }
        }
        self.grids.push(grid.clone());
        self.baseline_integrals.push(integral);
        info!(
            "Registered grid \"{}\" ({}) as #{}",
            grid.name(),
            grid.binning(),
            self.grids.len()
        );
        debug!("Baseline integral of \"{}\": {}", grid.name(), integral);
        Ok(self.grids.len() - 1)
    }

    pub fn grids(&self) -> &[Grid] {
        &self.grids
    }

    pub fn get(&self, index: usize) -> Option<&Grid> {
        self.grids.get(index)
    }

    /// Binning shared by all registered grids.
    pub fn binning(&self) -> Option<&Binning> {
        self.grids.first().map(|grid| grid.binning())
    }

    /// Integral of the grid at registration time.
    pub fn baseline_integral(&self, index: usize) -> Option<f64> {
        self.baseline_integrals.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}
