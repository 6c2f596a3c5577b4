//! Decoded band samples

use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::validation;

/// Row-major grid of samples decoded from one band
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl PixelGrid {
    /// Creates a grid filled with zeros
    ///
    /// Fails for dimensions whose product overflows or exceeds
    /// `MAX_GRID_PIXELS`.
    pub fn new(width: usize, height: usize) -> TiffResult<Self> {
        let len = validation::checked_grid_len(width, height)?;

        Ok(PixelGrid {
            width,
            height,
            values: vec![0.0; len],
        })
    }

    /// Wraps existing row-major values
    pub fn from_values(width: usize, height: usize, values: Vec<f64>) -> TiffResult<Self> {
        let len = validation::checked_grid_len(width, height)?;
        if values.len() != len {
            return Err(TiffError::GenericError(format!(
                "Grid of {}x{} needs {} values, got {}",
                width, height, len, values.len()
            )));
        }

        Ok(PixelGrid { width, height, values })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sample at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.values.get(y * self.width + x).copied()
    }

    pub(crate) fn set(&mut self, x: usize, y: usize, value: f64) {
        if x < self.width && y < self.height {
            self.values[y * self.width + x] = value;
        }
    }

    /// All samples in row-major order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_indexing() {
        let grid = PixelGrid::from_values(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(grid.get(0, 1), Some(4.0));
        assert_eq!(grid.get(2, 0), Some(3.0));
        assert_eq!(grid.get(3, 0), None);
    }

    #[test]
    fn test_value_count_must_match_dimensions() {
        assert!(PixelGrid::from_values(2, 2, vec![0.0; 3]).is_err());
    }
}
