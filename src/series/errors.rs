//! Errors raised while turning one raster file into a result

use std::fmt;

use crate::tiff::errors::TiffError;

/// The filename does not carry a usable acquisition date
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    /// Fewer underscore-separated parts than the date position needs
    TooFewParts { filename: String, parts: usize },
    /// The date token is not exactly eight characters long
    BadTokenLength { token: String },
    /// The date token holds something other than ASCII digits
    NonNumeric { token: String },
}

impl fmt::Display for DateParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateParseError::TooFewParts { filename, parts } => {
                write!(f, "filename {:?} has {} underscore-separated parts, need at least 4", filename, parts)
            },
            DateParseError::BadTokenLength { token } => {
                write!(f, "date token {:?} is not 8 characters (YYYYMMDD)", token)
            },
            DateParseError::NonNumeric { token } => {
                write!(f, "date token {:?} is not all digits", token)
            },
        }
    }
}

impl std::error::Error for DateParseError {}

/// The raster could not be opened or its first band could not be decoded
#[derive(Debug)]
pub enum ExtractError {
    /// Missing file, unreadable header or no image directory
    Open(TiffError),
    /// The first band uses a layout or encoding that cannot be decoded
    Decode(TiffError),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::Open(e) => write!(f, "cannot open raster: {}", e),
            ExtractError::Decode(e) => write!(f, "cannot decode band 1: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractError::Open(e) | ExtractError::Decode(e) => Some(e),
        }
    }
}
