//! TIFF validation utilities
//!
//! Sanity checks applied while walking a file's header and IFD chain, so a
//! corrupt scene fails early with a descriptive error instead of a bogus read.

use log::{debug, error, warn};
use std::io::{Seek, SeekFrom};

use crate::io::seekable::SeekableReader;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::constants::header;

/// Largest band, in pixels, decoded into memory
pub const MAX_GRID_PIXELS: usize = 1 << 28;

/// Validates an IFD offset to ensure it's within the file and past the header
pub fn validate_ifd_offset(offset: u64, file_size: u64) -> TiffResult<()> {
    if offset >= file_size || offset < 8 {
        return Err(TiffError::GenericError(format!(
            "Invalid IFD offset: {} (file size: {})",
            offset, file_size
        )));
    }

    Ok(())
}

/// Gets the file size for validation purposes
///
/// Returns `u64::MAX` when the size cannot be determined; the reader
/// position is restored either way.
pub fn get_file_size(reader: &mut dyn SeekableReader) -> TiffResult<u64> {
    let current_position = reader.stream_position()?;
    let file_size = match reader.seek(SeekFrom::End(0)) {
        Ok(size) => size,
        Err(e) => {
            warn!("Could not determine file size: {}", e);
            u64::MAX
        }
    };
    reader.seek(SeekFrom::Start(current_position))?;

    Ok(file_size)
}

/// Validates the BigTIFF header
///
/// After the version number (43) a BigTIFF header carries the offset size,
/// which must be 8, and a reserved word, which must be 0.
pub fn validate_bigtiff_header(
    reader: &mut dyn SeekableReader,
    byte_order_handler: &dyn ByteOrderHandler
) -> TiffResult<()> {
    let offset_size = byte_order_handler.read_u16(reader)?;
    let zeros = byte_order_handler.read_u16(reader)?;

    debug!("BigTIFF offset size: {}, reserved: {}", offset_size, zeros);

    if offset_size != header::BIGTIFF_OFFSET_SIZE || zeros != 0 {
        error!("Invalid BigTIFF header: offset_size={}, zeros={}", offset_size, zeros);
        return Err(TiffError::InvalidBigTIFFHeader);
    }

    Ok(())
}

/// Checks that a block of pixel data is long enough for its geometry
pub fn validate_block_length(data: &[u8], expected: usize) -> TiffResult<()> {
    if data.len() < expected {
        return Err(TiffError::TruncatedData {
            expected,
            actual: data.len(),
        });
    }

    Ok(())
}

/// Checks that `length` bytes starting at `offset` lie inside the file
pub fn validate_extent(offset: u64, length: u64, file_size: u64) -> TiffResult<()> {
    match offset.checked_add(length) {
        Some(end) if end <= file_size => Ok(()),
        _ => Err(TiffError::OutOfBounds { offset, length, file_size }),
    }
}

/// Pixel count of a `width` x `height` grid, if it may be allocated
pub fn checked_grid_len(width: usize, height: usize) -> TiffResult<usize> {
    width.checked_mul(height)
        .filter(|&pixels| pixels <= MAX_GRID_PIXELS)
        .ok_or(TiffError::ImageTooLarge { width: width as u64, height: height as u64 })
}
