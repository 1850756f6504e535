// gridcut/src/classifier.rs

use crate::grid::{BinGeometry, Binning};
use crate::region::CutMode;
use crate::store::RegionStore;
use humantime::format_duration;
use log::debug;
use ndarray::Array2;
use std::time::Instant;

/// Order in which region families are tried after the loaded mask.
const EVALUATION_ORDER: [CutMode; 6] = [
    CutMode::InverseRectangle,
    CutMode::Rectangle,
    CutMode::BandX,
    CutMode::BandY,
    CutMode::AngledBand,
    CutMode::SingleBin,
];

/// Whether `bin` is rejected by the loaded mask or by any completed region.
pub fn is_cut(bin: &BinGeometry, store: &RegionStore, file_mask: Option<&Array2<bool>>) -> bool {
    if let Some(mask) = file_mask {
        if mask.get([bin.iy, bin.ix]).copied().unwrap_or(false) {
            return true;
        }
    }
    EVALUATION_ORDER
        .iter()
        .any(|&mode| store.regions_of(mode).any(|region| region.cuts(bin)))
}

/// Evaluates every bin; the result has shape `(y_bins, x_bins)`.
pub fn classify(
    binning: &Binning,
    store: &RegionStore,
    file_mask: Option<&Array2<bool>>,
) -> Array2<bool> {
    let now = Instant::now();
    let mask = Array2::from_shape_fn(binning.shape(), |(iy, ix)| {
        is_cut(&binning.bin_geometry(ix, iy), store, file_mask)
    });
    debug!(
        "Classified {} bins ({} cut) in {}",
        binning.nbins(),
        mask.iter().filter(|&&cut| cut).count(),
        format_duration(now.elapsed())
    );
    mask
}

/// Identifies the inputs a cached mask was computed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaskKey {
    pub store_revision: u64,
    pub file_mask_generation: u64,
}

/// Last computed mask, reused until its key changes.
#[derive(Debug, Default)]
pub struct MaskCache {
    entry: Option<(MaskKey, Array2<bool>)>,
}

impl MaskCache {
    pub fn get_or_compute<F>(&mut self, key: MaskKey, compute: F) -> &Array2<bool>
    where
        F: FnOnce() -> Array2<bool>,
    {
        let stale = !matches!(&self.entry, Some((cached, _)) if *cached == key);
        if stale {
            self.entry = None;
        }
        let (_, mask) = self.entry.get_or_insert_with(|| (key, compute()));
        mask
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
