//! Factory for creating compression handlers

use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;
use super::uncompressed::UncompressedHandler;
use super::deflate::AdobeDeflateHandler;
use super::zstd::ZstdHandler;
use super::lzw::LzwHandler;
use super::packbits::PackBitsHandler;

/// Factory for creating compression handlers
pub struct CompressionFactory;

impl CompressionFactory {
    /// Create a compression handler for the given compression code
    pub fn create_handler(code: u64) -> TiffResult<Box<dyn CompressionHandler>> {
        match u16::try_from(code) {
            Ok(compression::NONE) => Ok(Box::new(UncompressedHandler)),
            Ok(compression::LZW) => Ok(Box::new(LzwHandler)),
            Ok(compression::DEFLATE) | Ok(compression::DEFLATE_OLD) => Ok(Box::new(AdobeDeflateHandler)),
            Ok(compression::ZSTD) => Ok(Box::new(ZstdHandler::new())),
            Ok(compression::PACKBITS) => Ok(Box::new(PackBitsHandler)),
            _ => Err(TiffError::UnsupportedCompression(code))
        }
    }

    /// Get a handler by name
    pub fn get_handler_by_name(name: &str) -> TiffResult<Box<dyn CompressionHandler>> {
        match name.to_lowercase().as_str() {
            "uncompressed" | "none" => Ok(Box::new(UncompressedHandler)),
            "lzw" => Ok(Box::new(LzwHandler)),
            "deflate" | "zip" | "adobe deflate" => Ok(Box::new(AdobeDeflateHandler)),
            "zstd" => Ok(Box::new(ZstdHandler::new())),
            "packbits" => Ok(Box::new(PackBitsHandler)),
            _ => Err(TiffError::GenericError(format!("Unknown compression type: {}", name)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_resolve() {
        assert_eq!(CompressionFactory::create_handler(1).unwrap().name(), "Uncompressed");
        assert_eq!(CompressionFactory::create_handler(5).unwrap().name(), "LZW");
        assert_eq!(CompressionFactory::create_handler(8).unwrap().code(), 8);
        assert_eq!(CompressionFactory::create_handler(32946).unwrap().code(), 8);
        assert_eq!(CompressionFactory::create_handler(14).unwrap().name(), "ZSTD");
        assert_eq!(CompressionFactory::create_handler(32773).unwrap().name(), "PackBits");
    }

    #[test]
    fn test_jpeg_is_rejected() {
        match CompressionFactory::create_handler(7) {
            Err(TiffError::UnsupportedCompression(7)) => {},
            other => panic!("expected unsupported compression, got {:?}", other.map(|h| h.name())),
        }
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(CompressionFactory::get_handler_by_name("Deflate").unwrap().code(), 8);
        assert!(CompressionFactory::get_handler_by_name("jpeg2000").is_err());
    }
}
