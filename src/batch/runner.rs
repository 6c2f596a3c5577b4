//! Sequential batch processing of source directories
//!
//! Files are processed one at a time in directory order, then file name
//! order. A file that fails is logged and skipped; only configuration and
//! sink errors end the batch.

use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::batch::config::BatchConfig;
use crate::batch::errors::{BatchError, BatchResult};
use crate::batch::outcome::{BatchReport, FileOutcome, RasterFileRecord};
use crate::batch::sink::ResultSink;
use crate::series::{AcquisitionDate, ExtractionResult, RasterStatisticExtractor};
use crate::utils::progress::ProgressTracker;
use crate::utils::string_utils;

pub struct BatchRunner {
    config: BatchConfig,
    extractor: RasterStatisticExtractor,
}

impl BatchRunner {
    pub fn new(config: BatchConfig) -> Self {
        let extractor = RasterStatisticExtractor::new(config.no_vegetation_threshold);
        BatchRunner { config, extractor }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Regular files in `dir` whose name ends with `extension`, sorted by name
    pub fn list_rasters(dir: &Path, extension: &str) -> BatchResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(BatchError::MissingDirectory(dir.to_path_buf()));
        }

        let io_error = |source| BatchError::Io { path: dir.to_path_buf(), source };
        let mut files = Vec::new();

        for entry in fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            let matches = path.file_name()
                .map(|name| string_utils::ends_with_ignore_case(&name.to_string_lossy(), extension))
                .unwrap_or(false);

            if matches && path.is_file() {
                files.push(path);
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        debug!("Found {} rasters in {}", files.len(), dir.display());
        Ok(files)
    }

    /// Every raster of every source, in processing order
    pub fn discover(&self) -> BatchResult<Vec<RasterFileRecord>> {
        let mut records = Vec::new();
        for source in &self.config.sources {
            for path in Self::list_rasters(&source.path, &self.config.raster_extension)? {
                records.push(RasterFileRecord::new(path, source.sensor.clone()));
            }
        }
        Ok(records)
    }

    /// Decodes the date and extracts the median of one file
    pub fn process_file(&self, record: &RasterFileRecord) -> FileOutcome {
        let file = record.source_path.clone();

        let date = match AcquisitionDate::from_filename(&record.file_name()) {
            Ok(date) => date,
            Err(error) => return FileOutcome::ParseFailed { file, error },
        };
        if !date.is_calendar_plausible() {
            warn!("{}: {} is not a calendar date, keeping it as decoded", file.display(), date);
        }

        match self.extractor.median_for(&record.source_path) {
            Ok(median) => FileOutcome::Extracted(ExtractionResult::new(date, record.sensor_label.clone(), median)),
            Err(error) => FileOutcome::OpenFailed { file, error },
        }
    }

    /// Runs the whole batch, forwarding each result to `sink`
    pub fn run(&self, sink: &mut dyn ResultSink) -> BatchResult<BatchReport> {
        self.config.validate()?;
        let records = self.discover()?;
        info!("Processing {} rasters from {} sources", records.len(), self.config.sources.len());

        let progress = if self.config.show_progress {
            ProgressTracker::new(records.len() as u64, "Extracting medians")
        } else {
            ProgressTracker::hidden(records.len() as u64)
        };

        let mut report = BatchReport::default();
        for record in &records {
            progress.set_message(&record.file_name());
            let outcome = self.process_file(record);

            match &outcome {
                FileOutcome::Extracted(result) => {
                    sink.append(result).map_err(BatchError::Sink)?;
                    info!("{}", result);
                },
                failure => warn!("{}", failure),
            }

            report.push(outcome);
            progress.increment(1);
        }

        progress.finish();
        info!("{}", report);
        Ok(report)
    }
}
