//! Validity masking of decoded band samples

use std::fmt;

use crate::raster::grid::PixelGrid;
use crate::series::median::median;

/// How many cells each masking rule removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaskCounts {
    pub total: usize,
    /// Equal to the declared no-data value
    pub nodata: usize,
    /// NaN samples not already caught as no-data
    pub nan: usize,
    /// At or below the vegetation threshold
    pub non_vegetated: usize,
    pub valid: usize,
}

impl fmt::Display for MaskCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pixels: {} valid, {} no-data, {} NaN, {} at or below threshold",
               self.total, self.valid, self.nodata, self.nan, self.non_vegetated)
    }
}

/// A band grid where every cell is either a valid sample or masked out
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedGrid {
    width: usize,
    height: usize,
    cells: Vec<Option<f64>>,
    counts: MaskCounts,
}

impl MaskedGrid {
    /// Masks cells equal to `nodata`, NaN cells and cells `<= threshold`
    ///
    /// Rules are checked in that order and each masked cell is counted once,
    /// under the first rule that matched.
    pub fn apply(grid: &PixelGrid, nodata: Option<f64>, threshold: f64) -> Self {
        let mut counts = MaskCounts { total: grid.len(), ..MaskCounts::default() };

        let cells = grid.values().iter().map(|&value| {
            if nodata == Some(value) {
                counts.nodata += 1;
                None
            } else if value.is_nan() {
                counts.nan += 1;
                None
            } else if value <= threshold {
                counts.non_vegetated += 1;
                None
            } else {
                counts.valid += 1;
                Some(value)
            }
        }).collect();

        MaskedGrid {
            width: grid.width(),
            height: grid.height(),
            cells,
            counts,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at column `x`, row `y`; `None` outside the grid or when masked
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[y * self.width + x]
    }

    pub fn cells(&self) -> &[Option<f64>] {
        &self.cells
    }

    pub fn counts(&self) -> MaskCounts {
        self.counts
    }

    /// Whether no cell survived masking
    pub fn is_fully_masked(&self) -> bool {
        self.counts.valid == 0
    }

    /// The surviving samples in row-major order
    pub fn valid_values(&self) -> Vec<f64> {
        self.cells.iter().flatten().copied().collect()
    }

    /// Median of the surviving samples, `None` when fully masked
    pub fn median(&self) -> Option<f64> {
        median(self.valid_values())
    }
}
