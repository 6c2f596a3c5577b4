//! Compression handling for TIFF files
//!
//! This module implements strategies for handling different compression methods.
//! Strip and tile payloads are decompressed through a `CompressionHandler`
//! chosen by the `CompressionFactory` from the IFD's compression tag.

mod handler;
mod uncompressed;
mod deflate;
mod factory;
mod zstd;
mod lzw;
mod packbits;

pub use handler::CompressionHandler;
pub use uncompressed::UncompressedHandler;
pub use deflate::AdobeDeflateHandler;
pub use factory::CompressionFactory;
pub use zstd::ZstdHandler;
pub use lzw::LzwHandler;
pub use packbits::PackBitsHandler;
