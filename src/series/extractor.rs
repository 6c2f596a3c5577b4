//! Per-raster median extraction
//!
//! Opens a raster, decodes band 1, masks no-data, NaN and non-vegetated
//! pixels and takes the median of what remains.

use log::debug;
use std::path::Path;

use crate::raster::{Band, RasterDataset};
use crate::series::errors::ExtractError;
use crate::series::mask::MaskedGrid;
use crate::series::record::BandStatistics;

/// NDVI at or below this value is treated as bare ground, water or cloud
pub const DEFAULT_NO_VEGETATION_THRESHOLD: f64 = 0.0;

/// Computes band statistics for raster files
#[derive(Debug, Clone, Copy)]
pub struct RasterStatisticExtractor {
    no_vegetation_threshold: f64,
}

impl Default for RasterStatisticExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_NO_VEGETATION_THRESHOLD)
    }
}

impl RasterStatisticExtractor {
    pub fn new(no_vegetation_threshold: f64) -> Self {
        RasterStatisticExtractor { no_vegetation_threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.no_vegetation_threshold
    }

    /// Statistics of band 1 of the raster at `path`
    pub fn extract(&self, path: &Path) -> Result<BandStatistics, ExtractError> {
        let dataset = RasterDataset::open(path).map_err(ExtractError::Open)?;
        let band = dataset.read_first_band().map_err(ExtractError::Decode)?;

        let statistics = self.statistics(&band);
        debug!("{}: {}", path.display(), statistics);
        Ok(statistics)
    }

    /// Median of band 1, `Ok(None)` when no pixel is valid
    pub fn median_for(&self, path: &Path) -> Result<Option<f64>, ExtractError> {
        self.extract(path).map(|statistics| statistics.median)
    }

    /// Applies the mask to an already decoded band
    pub fn mask(&self, band: &Band) -> MaskedGrid {
        MaskedGrid::apply(&band.grid, band.nodata(), self.no_vegetation_threshold)
    }

    pub fn statistics(&self, band: &Band) -> BandStatistics {
        let masked = self.mask(band);

        BandStatistics {
            median: masked.median(),
            counts: masked.counts(),
            nodata: band.nodata(),
            width: masked.width(),
            height: masked.height(),
        }
    }
}
