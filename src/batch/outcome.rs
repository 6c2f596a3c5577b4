//! Per-file outcomes and the batch report

use std::fmt;
use std::path::{Path, PathBuf};

use crate::series::{DateParseError, ExtractError, ExtractionResult};

/// One raster discovered in a source directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterFileRecord {
    pub source_path: PathBuf,
    pub sensor_label: String,
}

impl RasterFileRecord {
    pub fn new(source_path: impl Into<PathBuf>, sensor_label: impl Into<String>) -> Self {
        RasterFileRecord {
            source_path: source_path.into(),
            sensor_label: sensor_label.into(),
        }
    }

    /// Final path component, the part the date is decoded from
    pub fn file_name(&self) -> String {
        self.source_path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// What happened to one file
#[derive(Debug)]
pub enum FileOutcome {
    Extracted(ExtractionResult),
    /// The filename carries no usable date
    ParseFailed { file: PathBuf, error: DateParseError },
    /// The raster could not be opened or decoded
    OpenFailed { file: PathBuf, error: ExtractError },
}

impl FileOutcome {
    pub fn result(&self) -> Option<&ExtractionResult> {
        match self {
            FileOutcome::Extracted(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_extracted(&self) -> bool {
        matches!(self, FileOutcome::Extracted(_))
    }

    /// Path of the failed file, `None` for successes
    pub fn failed_file(&self) -> Option<&Path> {
        match self {
            FileOutcome::Extracted(_) => None,
            FileOutcome::ParseFailed { file, .. } | FileOutcome::OpenFailed { file, .. } => Some(file),
        }
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Extracted(result) => write!(f, "{}", result),
            FileOutcome::ParseFailed { file, error } => write!(f, "Skipping {}: {}", file.display(), error),
            FileOutcome::OpenFailed { file, error } => write!(f, "Skipping {}: {}", file.display(), error),
        }
    }
}

/// Every outcome of a batch, in processing order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn push(&mut self, outcome: FileOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Files that produced a result, undefined medians included
    pub fn extracted(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_extracted()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.extracted()
    }

    /// Results whose median is undefined
    pub fn empty(&self) -> usize {
        self.results().filter(|result| result.is_undefined()).count()
    }

    pub fn results(&self) -> impl Iterator<Item = &ExtractionResult> {
        self.outcomes.iter().filter_map(FileOutcome::result)
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_extracted())
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Processed {} files: {} extracted ({} without valid pixels), {} skipped",
               self.total(), self.extracted(), self.empty(), self.failed())
    }
}
