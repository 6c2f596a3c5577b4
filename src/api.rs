use std::path::Path;
use log::info;

use crate::batch::{BatchConfig, BatchReport, BatchResult, BatchRunner, RecordTable, ResultSink};
use crate::raster::RasterDataset;
use crate::series::{format_median, ExtractError, RasterStatisticExtractor};

/// Main interface to the ndvi-series library
pub struct NdviSeries {
    config: BatchConfig,
}

impl NdviSeries {
    pub fn new(config: BatchConfig) -> Self {
        NdviSeries { config }
    }

    /// Loads the batch configuration from a TOML file
    pub fn from_config_file(path: &Path) -> BatchResult<Self> {
        Ok(NdviSeries::new(BatchConfig::from_file(path)?))
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Runs the batch and collects every result into a table
    pub fn run(&self) -> BatchResult<(RecordTable, BatchReport)> {
        let mut table = RecordTable::new();
        let report = self.run_into(&mut table)?;
        Ok((table, report))
    }

    /// Runs the batch, sending results to a caller-supplied sink
    pub fn run_into(&self, sink: &mut dyn ResultSink) -> BatchResult<BatchReport> {
        BatchRunner::new(self.config.clone()).run(sink)
    }

    /// Median of band 1 of one raster with the given vegetation threshold
    pub fn median_for(path: &Path, threshold: f64) -> Result<Option<f64>, ExtractError> {
        RasterStatisticExtractor::new(threshold).median_for(path)
    }

    /// Summary of one raster's layout and masked median
    ///
    /// # Returns
    /// Multi-line description or the error that prevented reading band 1
    pub fn inspect(path: &Path, threshold: f64) -> Result<String, ExtractError> {
        let dataset = RasterDataset::open(path).map_err(ExtractError::Open)?;
        let band = dataset.read_first_band().map_err(ExtractError::Decode)?;
        let statistics = RasterStatisticExtractor::new(threshold).statistics(&band);
        info!("Inspected {}", path.display());

        let mut result = String::from("Raster Inspection Results:\n");
        result.push_str(&format!("  Format: {}\n", if dataset.tiff().is_big_tiff { "BigTIFF" } else { "TIFF" }));
        result.push_str(&format!("  Layout: {}\n", band.layout));
        result.push_str(&format!("  Mask: {}\n", statistics.counts));
        result.push_str(&format!("  Median: {}\n", format_median(statistics.median)));

        Ok(result)
    }
}
