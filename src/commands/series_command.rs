//! Median time series command
//!
//! Runs a batch over the configured source directories and writes the
//! resulting table to a file, or as CSV to stdout.

use clap::ArgMatches;
use log::info;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::batch::{BatchConfig, BatchRunner, RecordTable, SourceFolder, TableFormat};
use crate::batch::config::normalize_extension;
use crate::commands::command_traits::{Command, CommandError, CommandResult};

/// Command building a median NDVI time series
pub struct SeriesCommand {
    config: BatchConfig,
    output: Option<PathBuf>,
    format: String,
}

impl SeriesCommand {
    /// Builds the batch configuration from `--config` and the flags that
    /// extend or override it
    pub fn new(args: &ArgMatches) -> CommandResult<Self> {
        let mut config = match args.get_one::<String>("config") {
            Some(path) => {
                info!("Reading configuration from {}", path);
                BatchConfig::from_file(&PathBuf::from(path))?
            },
            None => BatchConfig::default(),
        };

        if let Some(assignments) = args.get_many::<String>("source") {
            for assignment in assignments {
                config.sources.push(SourceFolder::parse_assignment(assignment)?);
            }
        }

        if let Some(threshold) = args.get_one::<String>("threshold") {
            config.no_vegetation_threshold = threshold.parse::<f64>()
                .map_err(|_| CommandError::Usage(format!("Invalid threshold: {}", threshold)))?;
        }

        if let Some(extension) = args.get_one::<String>("extension") {
            config.raster_extension = normalize_extension(extension);
        }

        if args.get_flag("progress") {
            config.show_progress = true;
        }

        let format = args.get_one::<String>("format")
            .cloned()
            .unwrap_or_else(|| "csv".to_string());
        TableFormat::from_name(&format).map_err(|e| CommandError::Usage(e.to_string()))?;

        let output = args.get_one::<String>("output").map(PathBuf::from);
        if output.is_none() && format.to_lowercase() != "csv" {
            return Err(CommandError::Usage("Only CSV can be written to stdout; use --output".to_string()));
        }

        Ok(SeriesCommand { config, output, format })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }
}

impl Command for SeriesCommand {
    fn execute(&self) -> CommandResult<()> {
        let runner = BatchRunner::new(self.config.clone());
        let mut table = RecordTable::new();
        runner.run(&mut table)?;

        match &self.output {
            Some(path) => {
                table.save_to_file(path, &self.format)?;
                info!("Wrote {} records to {}", table.len(), path.display());
            },
            None => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                table.write_csv(&mut handle)?;
                handle.flush()?;
            },
        }

        Ok(())
    }
}
