//! Writing single-image TIFF files from pixel grids
//!
//! Produces the kinds of scenes the band decoder reads: any supported sample
//! type, either byte order, classic or BigTIFF, strips or tiles, interleaved
//! or planar bands, any supported compression and predictor, and an optional
//! GDAL no-data tag.
//!
//! File layout: header, pixel blocks, out-of-line tag values, then the IFD.

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use byteorder::ByteOrder as Endian;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::compression::CompressionFactory;
use crate::io::byte_order::ByteOrder;
use crate::raster::grid::PixelGrid;
use crate::raster::layout::BlockLayout;
use crate::raster::predictor::{Predictor, RowGeometry};
use crate::raster::sample::SampleType;
use crate::tiff::constants::{compression, field_types, header, photometric, planar_config, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::nodata;

/// A tag entry waiting to be laid out, its values already in file order
struct PendingEntry {
    tag: u16,
    field_type: u16,
    count: u64,
    bytes: Vec<u8>,
}

/// Builder that writes pixel grids as a TIFF file
#[derive(Debug, Clone)]
pub struct GridTiffWriter {
    sample_type: SampleType,
    byte_order: ByteOrder,
    big_tiff: bool,
    planar: bool,
    blocks: Option<BlockLayout>,
    compression: u64,
    predictor: Predictor,
    nodata: Option<f64>,
}

impl GridTiffWriter {
    /// Little-endian classic TIFF, one uncompressed strip, no no-data value
    pub fn new(sample_type: SampleType) -> Self {
        GridTiffWriter {
            sample_type,
            byte_order: ByteOrder::LittleEndian,
            big_tiff: false,
            planar: false,
            blocks: None,
            compression: compression::NONE as u64,
            predictor: Predictor::None,
            nodata: None,
        }
    }

    pub fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn big_tiff(mut self, big_tiff: bool) -> Self {
        self.big_tiff = big_tiff;
        self
    }

    /// Stores each band in its own blocks (planar configuration 2)
    pub fn planar(mut self, planar: bool) -> Self {
        self.planar = planar;
        self
    }

    pub fn strips(mut self, rows_per_strip: usize) -> Self {
        self.blocks = Some(BlockLayout::Strips { rows_per_strip: rows_per_strip.max(1) });
        self
    }

    pub fn tiles(mut self, tile_width: usize, tile_length: usize) -> Self {
        self.blocks = Some(BlockLayout::Tiles {
            tile_width: tile_width.max(1),
            tile_length: tile_length.max(1),
        });
        self
    }

    /// TIFF compression code, e.g. 5 for LZW or 8 for Deflate
    pub fn compression(mut self, code: u64) -> Self {
        self.compression = code;
        self
    }

    pub fn predictor(mut self, predictor: Predictor) -> Self {
        self.predictor = predictor;
        self
    }

    pub fn nodata(mut self, value: f64) -> Self {
        self.nodata = Some(value);
        self
    }

    /// Writes a single-band file
    pub fn write(&self, path: &Path, grid: &PixelGrid) -> TiffResult<()> {
        self.write_bands(path, std::slice::from_ref(grid))
    }

    /// Writes a file with one band per grid
    pub fn write_bands(&self, path: &Path, bands: &[PixelGrid]) -> TiffResult<()> {
        info!("Writing TIFF to {}", path.display());
        let bytes = self.to_bytes(bands)?;

        let file = File::create(path)?;
        let mut writer = BufWriter::with_capacity(1024 * 1024, file);
        writer.write_all(&bytes)?;
        writer.flush()?;

        Ok(())
    }

    /// Encodes the complete file in memory
    pub fn to_bytes(&self, bands: &[PixelGrid]) -> TiffResult<Vec<u8>> {
        let first = bands.first()
            .ok_or_else(|| TiffError::GenericError("At least one band is required".to_string()))?;
        let (width, height) = (first.width(), first.height());
        if width == 0 || height == 0 {
            return Err(TiffError::MissingDimensions);
        }
        if bands.iter().any(|band| band.width() != width || band.height() != height) {
            return Err(TiffError::GenericError("All bands must share the same dimensions".to_string()));
        }
        if self.predictor == Predictor::FloatingPoint && !self.sample_type.is_float() {
            return Err(TiffError::UnsupportedPredictor(self.predictor.code() as u64));
        }

        let handler = CompressionFactory::create_handler(self.compression)?;
        let blocks = self.blocks.unwrap_or(BlockLayout::Strips { rows_per_strip: height });

        let mut out = Vec::new();
        self.write_header(&mut out)?;

        let mut offsets = Vec::new();
        let mut byte_counts = Vec::new();
        let band_groups: Vec<&[PixelGrid]> = if self.planar {
            bands.chunks(1).collect()
        } else {
            vec![bands]
        };

        for group in band_groups {
            for raw in self.raw_blocks(group, blocks)? {
                let packed = handler.compress(&raw)?;
                align_to_word(&mut out);
                offsets.push(out.len() as u64);
                byte_counts.push(packed.len() as u64);
                out.extend_from_slice(&packed);
            }
        }
        debug!("Wrote {} {} blocks", offsets.len(), handler.name());

        let entries = self.build_entries(width, height, bands.len(), blocks, &offsets, &byte_counts)?;
        let ifd_offset = self.write_ifd(&mut out, &entries)?;
        self.patch_first_ifd_offset(&mut out, ifd_offset);

        Ok(out)
    }

    fn write_header(&self, out: &mut Vec<u8>) -> TiffResult<()> {
        out.extend_from_slice(&self.byte_order.marker());
        if self.big_tiff {
            put_u16(out, header::BIG_TIFF_VERSION, self.byte_order)?;
            put_u16(out, header::BIGTIFF_OFFSET_SIZE, self.byte_order)?;
            put_u16(out, 0, self.byte_order)?;
            put_u64(out, 0, self.byte_order)?;
        } else {
            put_u16(out, header::TIFF_VERSION, self.byte_order)?;
            put_u32(out, 0, self.byte_order)?;
        }
        Ok(())
    }

    /// Byte order the samples are laid out in before the predictor runs
    fn sample_order(&self) -> ByteOrder {
        match self.predictor {
            Predictor::FloatingPoint => ByteOrder::BigEndian,
            _ => self.byte_order,
        }
    }

    /// Uncompressed, predictor-encoded blocks for the bands of one group
    fn raw_blocks(&self, group: &[PixelGrid], blocks: BlockLayout) -> TiffResult<Vec<Vec<u8>>> {
        let (width, height) = (group[0].width(), group[0].height());
        let order = self.sample_order();
        let stride = group.len();
        let mut result = Vec::new();

        let push_pixel = |raw: &mut Vec<u8>, x: usize, y: usize| -> TiffResult<()> {
            for band in group {
                let value = band.get(x, y).unwrap_or(0.0);
                self.sample_type.encode(value, order, raw)?;
            }
            Ok(())
        };

        match blocks {
            BlockLayout::Strips { rows_per_strip } => {
                let mut first_row = 0;
                while first_row < height {
                    let rows = rows_per_strip.min(height - first_row);
                    let mut raw = Vec::with_capacity(rows * width * stride * self.sample_type.bytes());
                    for y in first_row..first_row + rows {
                        for x in 0..width {
                            push_pixel(&mut raw, x, y)?;
                        }
                    }
                    let geometry = RowGeometry { row_samples: width * stride, rows, stride };
                    self.predictor.encode(&mut raw, geometry, self.sample_type, order);
                    result.push(raw);
                    first_row += rows;
                }
            },
            BlockLayout::Tiles { tile_width, tile_length } => {
                for origin_y in (0..height).step_by(tile_length) {
                    for origin_x in (0..width).step_by(tile_width) {
                        let mut raw = Vec::with_capacity(tile_width * tile_length * stride * self.sample_type.bytes());
                        for y in origin_y..origin_y + tile_length {
                            for x in origin_x..origin_x + tile_width {
                                // Out-of-image positions read back as None and pad with zero
                                push_pixel(&mut raw, x, y)?;
                            }
                        }
                        let geometry = RowGeometry { row_samples: tile_width * stride, rows: tile_length, stride };
                        self.predictor.encode(&mut raw, geometry, self.sample_type, order);
                        result.push(raw);
                    }
                }
            },
        }

        Ok(result)
    }

    fn build_entries(&self, width: usize, height: usize, bands: usize, blocks: BlockLayout,
                     offsets: &[u64], byte_counts: &[u64]) -> TiffResult<Vec<PendingEntry>> {
        let order = self.byte_order;
        let mut entries = vec![
            dimension_entry(tags::IMAGE_WIDTH, width, order)?,
            dimension_entry(tags::IMAGE_LENGTH, height, order)?,
            short_entry(tags::BITS_PER_SAMPLE, &vec![self.sample_type.bits(); bands], order)?,
            short_entry(tags::COMPRESSION, &[self.compression as u16], order)?,
            short_entry(tags::PHOTOMETRIC_INTERPRETATION, &[photometric::BLACK_IS_ZERO], order)?,
            short_entry(tags::SAMPLES_PER_PIXEL, &[bands as u16], order)?,
            short_entry(tags::PLANAR_CONFIGURATION,
                        &[if self.planar { planar_config::PLANAR } else { planar_config::CHUNKY }], order)?,
            short_entry(tags::SAMPLE_FORMAT, &vec![self.sample_type.format_code(); bands], order)?,
        ];

        if self.predictor != Predictor::None {
            entries.push(short_entry(tags::PREDICTOR, &[self.predictor.code()], order)?);
        }

        match blocks {
            BlockLayout::Strips { rows_per_strip } => {
                entries.push(long_entry(tags::ROWS_PER_STRIP, &[rows_per_strip.min(height) as u32], order)?);
                entries.push(self.offset_entry(tags::STRIP_OFFSETS, offsets)?);
                entries.push(self.offset_entry(tags::STRIP_BYTE_COUNTS, byte_counts)?);
            },
            BlockLayout::Tiles { tile_width, tile_length } => {
                entries.push(long_entry(tags::TILE_WIDTH, &[tile_width as u32], order)?);
                entries.push(long_entry(tags::TILE_LENGTH, &[tile_length as u32], order)?);
                entries.push(self.offset_entry(tags::TILE_OFFSETS, offsets)?);
                entries.push(self.offset_entry(tags::TILE_BYTE_COUNTS, byte_counts)?);
            },
        }

        if let Some(value) = self.nodata {
            let mut bytes = nodata::format_nodata(value).into_bytes();
            bytes.push(0);
            entries.push(PendingEntry {
                tag: tags::GDAL_NODATA,
                field_type: field_types::ASCII,
                count: bytes.len() as u64,
                bytes,
            });
        }

        entries.sort_by_key(|entry| entry.tag);
        Ok(entries)
    }

    /// Offsets and byte counts are LONG in classic TIFF and LONG8 in BigTIFF
    fn offset_entry(&self, tag: u16, values: &[u64]) -> TiffResult<PendingEntry> {
        if self.big_tiff {
            let mut bytes = Vec::with_capacity(values.len() * 8);
            for &value in values {
                put_u64(&mut bytes, value, self.byte_order)?;
            }
            Ok(PendingEntry { tag, field_type: field_types::LONG8, count: values.len() as u64, bytes })
        } else {
            let narrowed = values.iter()
                .map(|&value| u32::try_from(value)
                    .map_err(|_| TiffError::GenericError("File too large for classic TIFF".to_string())))
                .collect::<TiffResult<Vec<u32>>>()?;
            long_entry(tag, &narrowed, self.byte_order)
        }
    }

    /// Appends out-of-line values and the IFD; returns the IFD offset
    fn write_ifd(&self, out: &mut Vec<u8>, entries: &[PendingEntry]) -> TiffResult<u64> {
        let order = self.byte_order;
        let inline_width = if self.big_tiff { 8 } else { 4 };

        let mut value_fields = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.bytes.len() <= inline_width {
                let mut field = entry.bytes.clone();
                field.resize(inline_width, 0);
                value_fields.push(field);
            } else {
                align_to_word(out);
                let offset = out.len() as u64;
                out.extend_from_slice(&entry.bytes);

                let mut field = Vec::with_capacity(inline_width);
                if self.big_tiff {
                    put_u64(&mut field, offset, order)?;
                } else {
                    put_u32(&mut field, offset as u32, order)?;
                }
                value_fields.push(field);
            }
        }

        align_to_word(out);
        let ifd_offset = out.len() as u64;

        if self.big_tiff {
            put_u64(out, entries.len() as u64, order)?;
        } else {
            put_u16(out, entries.len() as u16, order)?;
        }
        for (entry, field) in entries.iter().zip(value_fields) {
            put_u16(out, entry.tag, order)?;
            put_u16(out, entry.field_type, order)?;
            if self.big_tiff {
                put_u64(out, entry.count, order)?;
            } else {
                put_u32(out, entry.count as u32, order)?;
            }
            out.extend_from_slice(&field);
        }

        // No further IFDs
        if self.big_tiff {
            put_u64(out, 0, order)?;
        } else {
            put_u32(out, 0, order)?;
        }

        Ok(ifd_offset)
    }

    fn patch_first_ifd_offset(&self, out: &mut [u8], ifd_offset: u64) {
        match (self.big_tiff, self.byte_order) {
            (true, ByteOrder::LittleEndian) => LittleEndian::write_u64(&mut out[8..16], ifd_offset),
            (true, ByteOrder::BigEndian) => BigEndian::write_u64(&mut out[8..16], ifd_offset),
            (false, ByteOrder::LittleEndian) => LittleEndian::write_u32(&mut out[4..8], ifd_offset as u32),
            (false, ByteOrder::BigEndian) => BigEndian::write_u32(&mut out[4..8], ifd_offset as u32),
        }
    }
}

fn align_to_word(out: &mut Vec<u8>) {
    if out.len() % 2 != 0 {
        out.push(0);
    }
}

fn put_u16(out: &mut Vec<u8>, value: u16, order: ByteOrder) -> TiffResult<()> {
    match order {
        ByteOrder::LittleEndian => out.write_u16::<LittleEndian>(value)?,
        ByteOrder::BigEndian => out.write_u16::<BigEndian>(value)?,
    }
    Ok(())
}

fn put_u32(out: &mut Vec<u8>, value: u32, order: ByteOrder) -> TiffResult<()> {
    match order {
        ByteOrder::LittleEndian => out.write_u32::<LittleEndian>(value)?,
        ByteOrder::BigEndian => out.write_u32::<BigEndian>(value)?,
    }
    Ok(())
}

fn put_u64(out: &mut Vec<u8>, value: u64, order: ByteOrder) -> TiffResult<()> {
    match order {
        ByteOrder::LittleEndian => out.write_u64::<LittleEndian>(value)?,
        ByteOrder::BigEndian => out.write_u64::<BigEndian>(value)?,
    }
    Ok(())
}

fn short_entry(tag: u16, values: &[u16], order: ByteOrder) -> TiffResult<PendingEntry> {
    let mut bytes = Vec::with_capacity(values.len() * 2);
    for &value in values {
        put_u16(&mut bytes, value, order)?;
    }
    Ok(PendingEntry { tag, field_type: field_types::SHORT, count: values.len() as u64, bytes })
}

fn long_entry(tag: u16, values: &[u32], order: ByteOrder) -> TiffResult<PendingEntry> {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for &value in values {
        put_u32(&mut bytes, value, order)?;
    }
    Ok(PendingEntry { tag, field_type: field_types::LONG, count: values.len() as u64, bytes })
}

/// Image dimensions go in a SHORT when they fit, as libtiff writes them
fn dimension_entry(tag: u16, value: usize, order: ByteOrder) -> TiffResult<PendingEntry> {
    match u16::try_from(value) {
        Ok(short) => short_entry(tag, &[short], order),
        Err(_) => long_entry(tag, &[value as u32], order),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_points_at_ifd() {
        let grid = PixelGrid::from_values(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let bytes = GridTiffWriter::new(SampleType::U8).to_bytes(&[grid]).unwrap();

        assert_eq!(&bytes[0..4], &[0x49, 0x49, 42, 0]);
        let ifd_offset = LittleEndian::read_u32(&bytes[4..8]) as usize;
        // 4 pixel bytes follow the header; the IFD starts right after them
        assert_eq!(&bytes[8..12], &[1, 2, 3, 4]);
        assert_eq!(ifd_offset, 12);
    }

    #[test]
    fn test_rejects_mismatched_bands() {
        let a = PixelGrid::new(2, 2).unwrap();
        let b = PixelGrid::new(3, 2).unwrap();
        assert!(GridTiffWriter::new(SampleType::U8).to_bytes(&[a, b]).is_err());
    }

    #[test]
    fn test_floating_point_predictor_needs_floats() {
        let grid = PixelGrid::new(2, 2).unwrap();
        let writer = GridTiffWriter::new(SampleType::I16).predictor(Predictor::FloatingPoint);
        assert!(matches!(writer.to_bytes(&[grid]), Err(TiffError::UnsupportedPredictor(3))));
    }
}
