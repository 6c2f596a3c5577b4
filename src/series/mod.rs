//! Turning NDVI scenes into dated median values
//!
//! The date comes from the scene's filename, the value from the median of
//! band 1 after masking. Both steps are pure functions of their input.

pub mod date;
pub mod errors;
pub mod extractor;
pub mod mask;
pub mod median;
pub mod record;

pub use date::AcquisitionDate;
pub use errors::{DateParseError, ExtractError};
pub use extractor::{RasterStatisticExtractor, DEFAULT_NO_VEGETATION_THRESHOLD};
pub use mask::{MaskCounts, MaskedGrid};
pub use median::median;
pub use record::{format_median, BandStatistics, ExtractionResult};
