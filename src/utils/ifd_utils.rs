//! IFD utilities
//!
//! Utilities for locating Image File Directories (IFDs) in TIFF files.

use crate::io::seekable::SeekableReader;
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;

/// Reads an IFD offset (the header's first offset or an IFD's next pointer)
///
/// Offsets are 8 bytes wide in BigTIFF and 4 bytes in classic TIFF.
/// A value of 0 terminates the IFD chain.
pub fn read_ifd_offset(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler
) -> TiffResult<u64> {
    if is_big_tiff {
        byte_order_handler.read_u64(reader).map_err(TiffError::IoError)
    } else {
        byte_order_handler.read_u32(reader)
            .map(|v| v as u64)
            .map_err(TiffError::IoError)
    }
}

/// Calculates the size of an IFD in bytes
///
/// Used to determine where the next IFD offset is located
pub fn calculate_ifd_size(ifd: &IFD, is_big_tiff: bool) -> u64 {
    if is_big_tiff {
        // 8 (entry count) + 20 (each entry)
        8 + (20 * ifd.entries.len() as u64)
    } else {
        // 2 (entry count) + 12 (each entry)
        2 + (12 * ifd.entries.len() as u64)
    }
}
