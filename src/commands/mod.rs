//! CLI command implementations
//!
//! This module contains implementations of the commands supported by the
//! CLI application using the Command pattern.

pub mod command_traits;
pub mod inspect_command;
pub mod series_command;

pub use command_traits::{Command, CommandError, CommandFactory, CommandResult};
pub use inspect_command::InspectCommand;
pub use series_command::SeriesCommand;

use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};

/// Picks the inspect command when `--inspect` is given, the series command
/// otherwise
#[derive(Default)]
pub struct SeriesCommandFactory;

impl SeriesCommandFactory {
    pub fn new() -> Self {
        SeriesCommandFactory
    }
}

impl CommandFactory for SeriesCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> CommandResult<Box<dyn Command>> {
        if args.get_one::<String>("inspect").is_some() {
            Ok(Box::new(InspectCommand::new(args)?))
        } else {
            Ok(Box::new(SeriesCommand::new(args)?))
        }
    }
}

/// Command-line interface definition
pub fn cli() -> ClapCommand {
    ClapCommand::new("ndvi-series")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build a median NDVI time series from directories of dated rasters")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("TOML file listing source directories and settings")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .help("Source directory and its sensor label, e.g. 'L7/NDVI=Landsat7 (ETM+)'")
                .value_name("DIR=SENSOR")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Write the table to this file instead of stdout")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .help("Table format (csv, json)")
                .value_name("FORMAT")
                .default_value("csv"),
        )
        .arg(
            Arg::new("threshold")
                .short('t')
                .long("threshold")
                .help("Pixels at or below this value count as non-vegetated")
                .value_name("VALUE")
                .allow_negative_numbers(true)
                .required(false),
        )
        .arg(
            Arg::new("extension")
                .short('e')
                .long("extension")
                .help("Raster file extension to match, case-insensitive (default .tif)")
                .value_name("EXT")
                .required(false),
        )
        .arg(
            Arg::new("inspect")
                .short('i')
                .long("inspect")
                .help("Describe a single raster and its masked median instead of running a batch")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("progress")
                .short('p')
                .long("progress")
                .help("Show a progress bar")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only report warnings and errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Also write log lines to this file")
                .value_name("FILE")
                .required(false),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_command_merges_flags() {
        let dir = tempfile::tempdir().unwrap();
        let source = format!("{}=Landsat7 (ETM+)", dir.path().display());
        let args = cli().get_matches_from(vec![
            "ndvi-series", "--source", source.as_str(), "--threshold", "-0.1", "--extension", "TIF",
        ]);

        let command = SeriesCommand::new(&args).unwrap();
        let config = command.config();
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].sensor, "Landsat7 (ETM+)");
        assert_eq!(config.no_vegetation_threshold, -0.1);
        assert_eq!(config.raster_extension, ".TIF");
    }

    #[test]
    fn test_json_needs_output_file() {
        let args = cli().get_matches_from(vec!["ndvi-series", "--format", "json"]);
        assert!(matches!(SeriesCommand::new(&args), Err(CommandError::Usage(_))));
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let args = cli().get_matches_from(vec!["ndvi-series", "--format", "xml", "-o", "out.xml"]);
        assert!(matches!(SeriesCommand::new(&args), Err(CommandError::Usage(_))));
    }

    #[test]
    fn test_factory_picks_inspect() {
        let args = cli().get_matches_from(vec!["ndvi-series", "--inspect", "scene.tif"]);
        assert!(SeriesCommandFactory::new().create_command(&args).is_ok());
    }
}
