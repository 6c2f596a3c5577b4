//! Custom error types for TIFF processing

use std::fmt;
use std::io;

/// TIFF-specific error types
#[derive(Debug)]
pub enum TiffError {
    /// I/O error
    IoError(io::Error),
    /// Invalid byte order marker
    InvalidByteOrder(u16),
    /// Invalid BigTIFF header
    InvalidBigTIFFHeader,
    /// Unsupported TIFF version
    UnsupportedVersion(u16),
    /// The file contains no image directory
    NoImageDirectory,
    /// Tag not found
    TagNotFound(u16),
    /// Unsupported field type
    UnsupportedFieldType(u16),
    /// Unsupported compression method
    UnsupportedCompression(u64),
    /// Unsupported predictor
    UnsupportedPredictor(u64),
    /// Sample layout that cannot be decoded to numbers (bits, sample format)
    UnsupportedSampleFormat { bits: u64, format: u64 },
    /// Image dimensions not found
    MissingDimensions,
    /// A strip or tile holds fewer bytes than its geometry requires
    TruncatedData { expected: usize, actual: usize },
    /// A tag payload or pixel block extends past the end of the file
    OutOfBounds { offset: u64, length: u64, file_size: u64 },
    /// Declared dimensions too large to decode into memory
    ImageTooLarge { width: u64, height: u64 },
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for TiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TiffError::IoError(e) => write!(f, "I/O error: {}", e),
            TiffError::InvalidByteOrder(v) => write!(f, "Invalid byte order marker: {:#06x}", v),
            TiffError::InvalidBigTIFFHeader => write!(f, "Invalid BigTIFF header"),
            TiffError::UnsupportedVersion(v) => write!(f, "Unsupported TIFF version: {}", v),
            TiffError::NoImageDirectory => write!(f, "No image directory found in TIFF file"),
            TiffError::TagNotFound(tag) => write!(f, "Tag not found: {}", tag),
            TiffError::UnsupportedFieldType(ft) => write!(f, "Unsupported field type: {}", ft),
            TiffError::UnsupportedCompression(c) => write!(f, "Unsupported compression method: {}", c),
            TiffError::UnsupportedPredictor(p) => write!(f, "Unsupported predictor: {}", p),
            TiffError::UnsupportedSampleFormat { bits, format } => {
                write!(f, "Unsupported sample layout: {} bits, sample format {}", bits, format)
            },
            TiffError::MissingDimensions => write!(f, "Image dimensions not found"),
            TiffError::TruncatedData { expected, actual } => {
                write!(f, "Truncated pixel data: expected {} bytes, got {}", expected, actual)
            },
            TiffError::OutOfBounds { offset, length, file_size } => {
                write!(f, "{} bytes at offset {} lie past the end of the file ({} bytes)",
                       length, offset, file_size)
            },
            TiffError::ImageTooLarge { width, height } => {
                write!(f, "Image of {}x{} pixels is too large to decode", width, height)
            },
            TiffError::GenericError(msg) => write!(f, "TIFF error: {}", msg),
        }
    }
}

impl std::error::Error for TiffError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TiffError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TiffError {
    fn from(error: io::Error) -> Self {
        TiffError::IoError(error)
    }
}

/// Result type for TIFF operations
pub type TiffResult<T> = Result<T, TiffError>;
