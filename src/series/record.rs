//! Per-file results

use std::fmt;

use crate::series::date::AcquisitionDate;
use crate::series::mask::MaskCounts;

/// Median of one scene, attributed to its date and sensor
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub date: AcquisitionDate,
    pub sensor: String,
    /// `None` when every pixel was masked out
    pub median_value: Option<f64>,
}

impl ExtractionResult {
    pub fn new(date: AcquisitionDate, sensor: impl Into<String>, median_value: Option<f64>) -> Self {
        ExtractionResult {
            date,
            sensor: sensor.into(),
            median_value,
        }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn date_string(&self) -> String {
        self.date.display_string()
    }

    /// Whether the scene had no valid pixel
    pub fn is_undefined(&self) -> bool {
        self.median_value.is_none()
    }
}

impl fmt::Display for ExtractionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} -> median value: {}", self.sensor, self.date, format_median(self.median_value))
    }
}

/// Human-readable median, `undefined` for fully masked scenes
pub fn format_median(median: Option<f64>) -> String {
    match median {
        Some(value) => value.to_string(),
        None => "undefined".to_string(),
    }
}

/// Median plus the masking diagnostics behind it
#[derive(Debug, Clone, PartialEq)]
pub struct BandStatistics {
    pub median: Option<f64>,
    pub counts: MaskCounts,
    /// The no-data value the mask used, if the file declared one
    pub nodata: Option<f64>,
    pub width: usize,
    pub height: usize,
}

impl fmt::Display for BandStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}, median {}, {}", self.width, self.height, format_median(self.median), self.counts)
    }
}
