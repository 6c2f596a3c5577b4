//! Batch configuration
//!
//! Read from TOML:
//!
//! ```toml
//! raster_extension = ".tif"
//! no_vegetation_threshold = 0.0
//!
//! [[sources]]
//! path = "Landsat_4_5/NDVI"
//! sensor = "Landsat4/5 (TM)"
//! ```
//!
//! Relative source paths in a file are resolved against the file's directory.

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::batch::errors::{BatchError, BatchResult};
use crate::series::DEFAULT_NO_VEGETATION_THRESHOLD;

pub const DEFAULT_RASTER_EXTENSION: &str = ".tif";

/// A directory of scenes and the sensor that acquired them
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFolder {
    pub path: PathBuf,
    pub sensor: String,
}

impl SourceFolder {
    pub fn new(path: impl Into<PathBuf>, sensor: impl Into<String>) -> Self {
        SourceFolder {
            path: path.into(),
            sensor: sensor.into(),
        }
    }

    /// Parses a `DIR=SENSOR` command-line assignment
    pub fn parse_assignment(assignment: &str) -> BatchResult<Self> {
        match assignment.rsplit_once('=') {
            Some((path, sensor)) if !path.trim().is_empty() && !sensor.trim().is_empty() => {
                Ok(SourceFolder::new(path.trim(), sensor.trim()))
            },
            _ => Err(BatchError::Config(format!("expected DIR=SENSOR, got {:?}", assignment))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// Processed in order
    pub sources: Vec<SourceFolder>,
    pub no_vegetation_threshold: f64,
    /// Matched case-insensitively against the end of each file name
    pub raster_extension: String,
    pub show_progress: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            sources: Vec::new(),
            no_vegetation_threshold: DEFAULT_NO_VEGETATION_THRESHOLD,
            raster_extension: DEFAULT_RASTER_EXTENSION.to_string(),
            show_progress: false,
        }
    }
}

impl BatchConfig {
    pub fn new(sources: Vec<SourceFolder>) -> Self {
        BatchConfig {
            sources,
            ..BatchConfig::default()
        }
    }

    pub fn with_source(mut self, source: SourceFolder) -> Self {
        self.sources.push(source);
        self
    }

    /// Parses a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> BatchResult<Self> {
        let value: toml::Table = content.parse()
            .map_err(|e| BatchError::Config(format!("Failed to parse TOML: {}", e)))?;
        let mut config = BatchConfig::default();

        if let Some(threshold) = value.get("no_vegetation_threshold") {
            config.no_vegetation_threshold = threshold.as_float()
                .or_else(|| threshold.as_integer().map(|i| i as f64))
                .ok_or_else(|| BatchError::Config("no_vegetation_threshold must be a number".to_string()))?;
        }

        if let Some(extension) = value.get("raster_extension") {
            let extension = extension.as_str()
                .ok_or_else(|| BatchError::Config("raster_extension must be a string".to_string()))?;
            config.raster_extension = normalize_extension(extension);
        }

        if let Some(progress) = value.get("progress") {
            config.show_progress = progress.as_bool()
                .ok_or_else(|| BatchError::Config("progress must be true or false".to_string()))?;
        }

        if let Some(sources) = value.get("sources") {
            let sources = sources.as_array()
                .ok_or_else(|| BatchError::Config("sources must be an array of tables".to_string()))?;

            for (index, source) in sources.iter().enumerate() {
                let field = |name: &str| {
                    source.get(name).and_then(|v| v.as_str()).ok_or_else(|| {
                        BatchError::Config(format!("sources[{}] needs a string `{}`", index, name))
                    })
                };
                config.sources.push(SourceFolder::new(field("path")?, field("sensor")?));
            }
        }

        debug!("Parsed configuration with {} sources", config.sources.len());
        Ok(config)
    }

    /// Reads a TOML configuration file
    pub fn from_file(path: &Path) -> BatchResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|source| BatchError::Io { path: path.to_path_buf(), source })?;
        let mut config = Self::from_toml_str(&content)?;

        if let Some(base) = path.parent() {
            for source in &mut config.sources {
                if source.path.is_relative() {
                    source.path = base.join(&source.path);
                }
            }
        }

        Ok(config)
    }

    /// Checks the configuration before any file is touched
    ///
    /// Every source directory must exist; a missing one is fatal.
    pub fn validate(&self) -> BatchResult<()> {
        if self.sources.is_empty() {
            return Err(BatchError::Config("no source directories configured".to_string()));
        }
        if !self.no_vegetation_threshold.is_finite() {
            return Err(BatchError::Config("no_vegetation_threshold must be finite".to_string()));
        }
        if self.raster_extension.is_empty() {
            return Err(BatchError::Config("raster_extension must not be empty".to_string()));
        }

        for source in &self.sources {
            if !source.path.is_dir() {
                return Err(BatchError::MissingDirectory(source.path.clone()));
            }
        }

        Ok(())
    }
}

/// `tif` and `.tif` both mean files ending in `.tif`
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim();
    if trimmed.is_empty() || trimmed.starts_with('.') {
        trimmed.to_string()
    } else {
        format!(".{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_full_document() {
        let config = BatchConfig::from_toml_str(r#"
            raster_extension = "TIF"
            no_vegetation_threshold = 0
            progress = true

            [[sources]]
            path = "/data/l5"
            sensor = "Landsat4/5 (TM)"

            [[sources]]
            path = "/data/l7"
            sensor = "Landsat7 (ETM+)"
        "#).unwrap();

        assert_eq!(config.raster_extension, ".TIF");
        assert_eq!(config.no_vegetation_threshold, 0.0);
        assert!(config.show_progress);
        assert_eq!(config.sources, vec![
            SourceFolder::new("/data/l5", "Landsat4/5 (TM)"),
            SourceFolder::new("/data/l7", "Landsat7 (ETM+)"),
        ]);
    }

    #[test]
    fn test_defaults_apply() {
        let config = BatchConfig::from_toml_str("").unwrap();
        assert_eq!(config.raster_extension, ".tif");
        assert_eq!(config.no_vegetation_threshold, 0.0);
        assert!(config.sources.is_empty());
    }

    #[test]
    fn test_source_needs_sensor() {
        let result = BatchConfig::from_toml_str("[[sources]]\npath = \"/data\"\n");
        assert!(matches!(result, Err(BatchError::Config(_))));
    }

    #[test]
    fn test_parse_assignment() {
        let source = SourceFolder::parse_assignment("/data/l7=Landsat7 (ETM+)").unwrap();
        assert_eq!(source, SourceFolder::new("/data/l7", "Landsat7 (ETM+)"));
        assert!(SourceFolder::parse_assignment("/data/l7").is_err());
        assert!(SourceFolder::parse_assignment("=Landsat7").is_err());
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let config = BatchConfig::new(vec![SourceFolder::new("/definitely/not/here", "L8")]);
        assert!(matches!(config.validate(), Err(BatchError::MissingDirectory(_))));
    }

    #[test]
    fn test_relative_paths_follow_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.toml");
        std::fs::write(&path, "[[sources]]\npath = \"ndvi\"\nsensor = \"L5\"\n").unwrap();

        let config = BatchConfig::from_file(&path).unwrap();
        assert_eq!(config.sources[0].path, dir.path().join("ndvi"));
    }
}
