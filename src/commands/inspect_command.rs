//! Single raster inspection command
//!
//! Logs how band 1 of one raster is laid out and what the mask makes of it.

use clap::ArgMatches;
use log::{debug, info, warn};
use std::path::PathBuf;

use crate::commands::command_traits::{Command, CommandError, CommandResult};
use crate::raster::RasterDataset;
use crate::series::{AcquisitionDate, ExtractError, RasterStatisticExtractor, DEFAULT_NO_VEGETATION_THRESHOLD};

pub struct InspectCommand {
    input_file: PathBuf,
    threshold: f64,
}

impl InspectCommand {
    pub fn new(args: &ArgMatches) -> CommandResult<Self> {
        let input_file = args.get_one::<String>("inspect")
            .map(PathBuf::from)
            .ok_or_else(|| CommandError::Usage("Missing raster to inspect".to_string()))?;

        let threshold = match args.get_one::<String>("threshold") {
            Some(value) => value.parse::<f64>()
                .map_err(|_| CommandError::Usage(format!("Invalid threshold: {}", value)))?,
            None => DEFAULT_NO_VEGETATION_THRESHOLD,
        };

        Ok(InspectCommand { input_file, threshold })
    }
}

impl Command for InspectCommand {
    fn execute(&self) -> CommandResult<()> {
        let dataset = RasterDataset::open(&self.input_file).map_err(ExtractError::Open)?;
        let tiff = dataset.tiff();

        info!("Raster: {}", self.input_file.display());
        info!("  Format: {}, {}", if tiff.is_big_tiff { "BigTIFF" } else { "TIFF" }, tiff.byte_order.name());
        info!("  Number of IFDs: {}", tiff.ifd_count());
        debug!("{}", tiff);

        let file_name = self.input_file.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        match AcquisitionDate::from_filename(&file_name) {
            Ok(date) => info!("  Acquisition date: {}", date),
            Err(e) => warn!("  Acquisition date: {}", e),
        }

        let band = dataset.read_first_band().map_err(ExtractError::Decode)?;
        let layout = &band.layout;
        info!("  Dimensions: {}x{}", layout.width, layout.height);
        info!("  Sample type: {}", layout.sample_type);
        info!("  Bands: {} ({})", layout.samples_per_pixel, if layout.planar { "planar" } else { "interleaved" });
        info!("  Blocks: {:?}, {} per band", layout.blocks, layout.blocks_per_band());
        info!("  Compression: {} ({})", layout.compression_name(), layout.compression);
        info!("  Predictor: {}", layout.predictor.name());
        match layout.nodata {
            Some(value) => info!("  No-data value: {}", value),
            None => info!("  No-data value: none"),
        }

        let statistics = RasterStatisticExtractor::new(self.threshold).statistics(&band);
        info!("  Mask (threshold {}): {}", self.threshold, statistics.counts);
        info!("  Median: {}", crate::series::format_median(statistics.median));

        Ok(())
    }
}
