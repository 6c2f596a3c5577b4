//! Batch extraction over directories of scenes

pub mod config;
pub mod errors;
pub mod outcome;
pub mod runner;
pub mod sink;

pub use config::{BatchConfig, SourceFolder, DEFAULT_RASTER_EXTENSION};
pub use errors::{BatchError, BatchResult};
pub use outcome::{BatchReport, FileOutcome, RasterFileRecord};
pub use runner::BatchRunner;
pub use sink::{CsvSink, RecordTable, ResultSink, TableFormat};
