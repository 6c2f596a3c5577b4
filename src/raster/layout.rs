//! Band layout described by an image directory

use log::{debug, warn};
use std::fmt;

use crate::io::byte_order::ByteOrder;
use crate::io::seekable::SeekableReader;
use crate::raster::predictor::Predictor;
use crate::raster::sample::SampleType;
use crate::tiff::constants::{compression, planar_config, predictor, sample_format, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::nodata;
use crate::tiff::reader::TiffReader;
use crate::tiff::validation;
use crate::utils::tag_utils;

/// How pixel payload blocks tile the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockLayout {
    Strips { rows_per_strip: usize },
    Tiles { tile_width: usize, tile_length: usize },
}

/// Everything needed to locate and decode band 1 of an image
#[derive(Debug, Clone)]
pub struct RasterLayout {
    pub width: usize,
    pub height: usize,
    pub samples_per_pixel: usize,
    pub sample_type: SampleType,
    /// Planar configuration 2: each band stored in its own blocks
    pub planar: bool,
    pub compression: u64,
    pub predictor: Predictor,
    pub blocks: BlockLayout,
    pub block_offsets: Vec<u64>,
    pub block_byte_counts: Vec<u64>,
    /// Declared no-data sentinel, rounded to the sample type
    pub nodata: Option<f64>,
    pub byte_order: ByteOrder,
}

impl RasterLayout {
    /// Reads the layout of `ifd` through `tiff_reader`
    pub fn from_ifd(tiff_reader: &TiffReader, reader: &mut dyn SeekableReader, ifd: &IFD) -> TiffResult<Self> {
        let (width, height) = ifd.get_dimensions().ok_or(TiffError::MissingDimensions)?;
        validation::checked_grid_len(width as usize, height as usize)?;
        let samples_per_pixel = ifd.get_samples_per_pixel().max(1) as usize;

        let bits = tiff_reader.read_tag_values_or(reader, ifd, tags::BITS_PER_SAMPLE, 1)?;
        let formats = tiff_reader.read_tag_values_or(reader, ifd, tags::SAMPLE_FORMAT,
                                                      sample_format::UNSIGNED as u64)?;
        let first_bits = bits.first().copied().unwrap_or(1);
        let first_format = formats.first().copied().unwrap_or(sample_format::UNSIGNED as u64);
        if bits.iter().any(|&b| b != first_bits) {
            return Err(TiffError::UnsupportedSampleFormat { bits: first_bits, format: first_format });
        }
        let sample_type = SampleType::from_tags(first_bits, first_format)?;

        let planar = match ifd.get_tag_value(tags::PLANAR_CONFIGURATION) {
            None => false,
            Some(v) if v == planar_config::CHUNKY as u64 => false,
            Some(v) if v == planar_config::PLANAR as u64 => true,
            Some(v) => return Err(TiffError::GenericError(format!("Invalid planar configuration: {}", v))),
        };

        let compression = ifd.get_tag_value(tags::COMPRESSION).unwrap_or(compression::NONE as u64);
        let predictor = Predictor::from_code(
            ifd.get_tag_value(tags::PREDICTOR).unwrap_or(predictor::NONE as u64), sample_type)?;

        let (blocks, offsets_tag, counts_tag) = if ifd.is_tiled() {
            let tile_width = ifd.get_tag_value(tags::TILE_WIDTH).unwrap_or(0) as usize;
            let tile_length = ifd.get_tag_value(tags::TILE_LENGTH).unwrap_or(0) as usize;
            if tile_width == 0 || tile_length == 0 {
                return Err(TiffError::GenericError("Tile dimensions must be non-zero".to_string()));
            }
            (BlockLayout::Tiles { tile_width, tile_length }, tags::TILE_OFFSETS, tags::TILE_BYTE_COUNTS)
        } else {
            // A missing RowsPerStrip means one strip for the whole image
            let rows_per_strip = ifd.get_tag_value(tags::ROWS_PER_STRIP)
                .map(|rows| rows.min(height))
                .unwrap_or(height)
                .max(1) as usize;
            (BlockLayout::Strips { rows_per_strip }, tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS)
        };

        let block_offsets = tiff_reader.read_tag_values(reader, ifd, offsets_tag)?;
        let block_byte_counts = tiff_reader.read_tag_values(reader, ifd, counts_tag)?;

        let nodata = match tiff_reader.read_ascii_tag(reader, ifd, tags::GDAL_NODATA)? {
            Some(text) => {
                let parsed = nodata::parse_nodata(&text);
                if parsed.is_none() {
                    warn!("Ignoring unparseable no-data value {:?}", text);
                }
                parsed.map(|value| sample_type.normalize(value))
            },
            None => None,
        };

        let byte_order = tiff_reader.byte_order()
            .ok_or_else(|| TiffError::GenericError("Byte order not yet determined".to_string()))?;

        let layout = RasterLayout {
            width: width as usize,
            height: height as usize,
            samples_per_pixel,
            sample_type,
            planar,
            compression,
            predictor,
            blocks,
            block_offsets,
            block_byte_counts,
            nodata,
            byte_order,
        };
        layout.block_bytes()?;
        debug!("Band layout: {}", layout);

        Ok(layout)
    }

    /// Samples per pixel stored inside one block
    pub fn samples_per_block_pixel(&self) -> usize {
        if self.planar { 1 } else { self.samples_per_pixel }
    }

    /// Decoded size in bytes of one full strip or tile
    pub fn block_bytes(&self) -> TiffResult<usize> {
        let (block_width, rows) = match self.blocks {
            BlockLayout::Strips { rows_per_strip } => (self.width, rows_per_strip),
            BlockLayout::Tiles { tile_width, tile_length } => (tile_width, tile_length),
        };
        block_width.checked_mul(rows)
            .and_then(|pixels| pixels.checked_mul(self.samples_per_block_pixel()))
            .and_then(|samples| samples.checked_mul(self.sample_type.bytes()))
            .ok_or_else(|| TiffError::GenericError(
                format!("Block of {}x{} pixels is too large", block_width, rows)))
    }

    /// Number of blocks covering one band
    pub fn blocks_per_band(&self) -> usize {
        match self.blocks {
            BlockLayout::Strips { rows_per_strip } => self.height.div_ceil(rows_per_strip),
            BlockLayout::Tiles { tile_width, tile_length } => {
                self.width.div_ceil(tile_width) * self.height.div_ceil(tile_length)
            },
        }
    }

    pub fn compression_name(&self) -> &'static str {
        tag_utils::get_compression_name(self.compression)
    }
}

impl fmt::Display for RasterLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} {}, {} band(s) {}, ", self.width, self.height, self.sample_type,
               self.samples_per_pixel, if self.planar { "planar" } else { "interleaved" })?;
        match self.blocks {
            BlockLayout::Strips { rows_per_strip } => write!(f, "strips of {} rows", rows_per_strip)?,
            BlockLayout::Tiles { tile_width, tile_length } => write!(f, "tiles of {}x{}", tile_width, tile_length)?,
        }
        write!(f, ", compression {}, predictor {}", self.compression_name(), self.predictor.name())?;
        match self.nodata {
            Some(value) => write!(f, ", no-data {}", value),
            None => write!(f, ", no no-data value"),
        }
    }
}
