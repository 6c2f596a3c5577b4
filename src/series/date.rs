//! Acquisition dates encoded in scene filenames
//!
//! Landsat-style product names carry the acquisition date as the fourth
//! underscore-separated token, e.g. `LT05_L2SP_144045_20010421_20200905_02_T1_NDVI.tif`.
//! The token is split into year, month and day without calendar validation.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::fmt;

use crate::series::errors::DateParseError;

/// Zero-based position of the date token in an underscore-split filename
pub const DATE_TOKEN_INDEX: usize = 3;

lazy_static! {
    static ref DATE_TOKEN: Regex = Regex::new(r"^[0-9]{8}$").unwrap();
}

/// Calendar date decoded from a `YYYYMMDD` token
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AcquisitionDate {
    year: i32,
    month: u32,
    day: u32,
}

impl AcquisitionDate {
    /// Decodes the date token of a filename
    pub fn from_filename(filename: &str) -> Result<Self, DateParseError> {
        let parts: Vec<&str> = filename.split('_').collect();
        let token = parts.get(DATE_TOKEN_INDEX).ok_or_else(|| DateParseError::TooFewParts {
            filename: filename.to_string(),
            parts: parts.len(),
        })?;

        Self::from_token(token)
    }

    /// Decodes an eight digit `YYYYMMDD` token
    pub fn from_token(token: &str) -> Result<Self, DateParseError> {
        if token.chars().count() != 8 {
            return Err(DateParseError::BadTokenLength { token: token.to_string() });
        }
        if !DATE_TOKEN.is_match(token) {
            return Err(DateParseError::NonNumeric { token: token.to_string() });
        }

        // The pattern admits only ASCII digits, so the fields cannot fail
        let digits = token.as_bytes();
        let field = |range: std::ops::Range<usize>| {
            digits[range].iter().fold(0u32, |value, digit| value * 10 + u32::from(digit - b'0'))
        };
        let year = field(0..4) as i32;
        let month = field(4..6);
        let day = field(6..8);

        debug!("Decoded date token {} as {}-{}-{}", token, year, month, day);
        Ok(AcquisitionDate { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// `DD-MM-YYYY` with zero-padded day and month
    pub fn display_string(&self) -> String {
        format!("{:02}-{:02}-{}", self.day, self.month, self.year)
    }

    /// Whether month and day fall in the ranges a calendar allows
    ///
    /// Only a range check: `20010231` is plausible.
    pub fn is_calendar_plausible(&self) -> bool {
        (1..=12).contains(&self.month) && (1..=31).contains(&self.day)
    }
}

impl fmt::Display for AcquisitionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_string())
    }
}
