//! Handler for LZW compressed data
//!
//! TIFF LZW packs codes most-significant-bit first and widens the code size
//! one code early, which is what libtiff and GDAL write. `weezl` implements
//! that variant behind `with_tiff_size_switch`.

use log::trace;
use weezl::BitOrder;
use weezl::decode::Decoder;
use weezl::encode::Encoder;

use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;

/// Symbol width of TIFF LZW input, always whole bytes
const LZW_SYMBOL_BITS: u8 = 8;

/// LZW compression handler (compression code 5)
pub struct LzwHandler;

impl CompressionHandler for LzwHandler {
    fn decompress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut decoder = Decoder::with_tiff_size_switch(BitOrder::Msb, LZW_SYMBOL_BITS);
        let output = decoder.decode(data)
            .map_err(|e| TiffError::GenericError(format!("LZW: {}", e)))?;

        trace!("LZW decompressed {} bytes to {} bytes", data.len(), output.len());
        Ok(output)
    }

    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut encoder = Encoder::with_tiff_size_switch(BitOrder::Msb, LZW_SYMBOL_BITS);
        encoder.encode(data)
            .map_err(|e| TiffError::GenericError(format!("LZW: {}", e)))
    }

    fn name(&self) -> &'static str {
        "LZW"
    }

    fn code(&self) -> u64 {
        5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bytes of the stream in `tests/fixtures/ramp_lzw.bin`: two 0..=255
    /// ramps followed by 8000 pseudo-random 6-bit values
    fn fixture_input() -> Vec<u8> {
        let mut data: Vec<u8> = (0..=255u8).chain(0..=255u8).collect();
        let mut state: u32 = 12345;
        for _ in 0..8000 {
            state = state.wrapping_mul(1103515245).wrapping_add(12345) & 0x7fff_ffff;
            data.push(((state >> 16) % 64) as u8);
        }
        data
    }

    #[test]
    fn test_decodes_hand_packed_stream() {
        // Codes CLEAR, 'A', 'B', 258 ("AB"), EOI, each 9 bits wide
        let packed = [0x80, 0x10, 0x48, 0x50, 0x28, 0x08];
        assert_eq!(LzwHandler.decompress(&packed).unwrap(), b"ABAB".to_vec());
    }

    #[test]
    fn test_decodes_libtiff_style_strip() {
        // Encoded with libtiff's code-width and table-reset rules; crosses
        // the 9, 10, 11 and 12 bit widths and one table reset
        let packed = include_bytes!("../../tests/fixtures/ramp_lzw.bin");
        assert_eq!(LzwHandler.decompress(packed).unwrap(), fixture_input());
    }

    #[test]
    fn test_compressed_strip_expands_back() {
        let data = fixture_input();
        let packed = LzwHandler.compress(&data).unwrap();
        assert_eq!(LzwHandler.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn test_invalid_code_is_an_error() {
        // CLEAR followed by code 400, which the table cannot hold yet
        assert!(LzwHandler.decompress(&[0x80, 0x64, 0x20, 0x20]).is_err());
    }
}
