//! Seekable reader trait
//!
//! Raster decoding jumps between the header, IFDs, tag arrays and
//! strip/tile payloads, so every reader in the crate must support seeking.

use std::io::{Read, Seek};

/// Trait for readers that can both read and seek
///
/// Implemented for files, buffered files and in-memory cursors alike.
pub trait SeekableReader: Read + Seek + Send + Sync {}

impl<T: Read + Seek + Send + Sync> SeekableReader for T {}
