//! I/O utilities for raster file access
//!
//! Traits and byte order strategies shared by the TIFF decoding layer.

pub mod seekable;
pub mod byte_order;
