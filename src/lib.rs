pub mod io;
pub mod tiff;
pub mod utils;
pub mod compression;
pub mod raster;
pub mod series;
pub mod batch;
pub mod commands;
pub mod api;

pub use crate::api::NdviSeries;

pub use tiff::TiffReader;
pub use raster::{GridTiffWriter, PixelGrid, RasterDataset, SampleType};
pub use series::{AcquisitionDate, ExtractionResult, RasterStatisticExtractor};
pub use batch::{BatchConfig, BatchRunner, RecordTable, SourceFolder};
