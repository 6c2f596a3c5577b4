//! Decoding of band 1 from strips or tiles
//!
//! Each block is read, decompressed, has its predictor reversed and is then
//! copied into a `PixelGrid`. For interleaved data only the first sample of
//! every pixel is kept; for planar data only the first band's blocks are read.

use log::{debug, trace};
use std::io::{Read, Seek, SeekFrom};

use crate::compression::{CompressionFactory, CompressionHandler};
use crate::io::byte_order::ByteOrder;
use crate::io::seekable::SeekableReader;
use crate::raster::grid::PixelGrid;
use crate::raster::layout::{BlockLayout, RasterLayout};
use crate::raster::predictor::RowGeometry;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::validation;

/// Reads the first band described by a `RasterLayout`
pub struct BandReader<'a> {
    layout: &'a RasterLayout,
}

/// A decompressed block whose samples are in `byte_order`
struct DecodedBlock {
    data: Vec<u8>,
    byte_order: ByteOrder,
}

impl<'a> BandReader<'a> {
    pub fn new(layout: &'a RasterLayout) -> Self {
        BandReader { layout }
    }

    /// Decodes band 1 into a grid of `f64` samples
    pub fn read_first_band(&self, reader: &mut dyn SeekableReader) -> TiffResult<PixelGrid> {
        let layout = self.layout;
        let handler = CompressionFactory::create_handler(layout.compression)?;
        debug!("Using compression: {}", handler.name());

        let blocks = layout.blocks_per_band();
        let available = layout.block_offsets.len().min(layout.block_byte_counts.len());
        if available < blocks {
            return Err(TiffError::GenericError(format!(
                "Band needs {} blocks but the directory lists {}", blocks, available)));
        }

        let mut grid = PixelGrid::new(layout.width, layout.height)?;
        let file_size = validation::get_file_size(reader)?;

        match layout.blocks {
            BlockLayout::Strips { rows_per_strip } => {
                for strip in 0..blocks {
                    let first_row = strip * rows_per_strip;
                    let rows = rows_per_strip.min(layout.height - first_row);
                    let geometry = self.geometry(layout.width, rows);
                    let block = self.decode_block(reader, strip, handler.as_ref(), geometry, file_size)?;

                    for row in 0..rows {
                        for x in 0..layout.width {
                            let value = self.sample_at(block.as_ref(), row * layout.width + x);
                            grid.set(x, first_row + row, value);
                        }
                    }
                }
            },
            BlockLayout::Tiles { tile_width, tile_length } => {
                let tiles_across = layout.width.div_ceil(tile_width);
                for tile in 0..blocks {
                    let origin_x = (tile % tiles_across) * tile_width;
                    let origin_y = (tile / tiles_across) * tile_length;
                    let geometry = self.geometry(tile_width, tile_length);
                    let block = self.decode_block(reader, tile, handler.as_ref(), geometry, file_size)?;

                    // Tiles are padded to full size at the right and bottom edges
                    let columns = tile_width.min(layout.width - origin_x);
                    let rows = tile_length.min(layout.height - origin_y);
                    for row in 0..rows {
                        for column in 0..columns {
                            let value = self.sample_at(block.as_ref(), row * tile_width + column);
                            grid.set(origin_x + column, origin_y + row, value);
                        }
                    }
                }
            },
        }

        debug!("Decoded {} blocks into a {}x{} grid", blocks, layout.width, layout.height);
        Ok(grid)
    }

    fn geometry(&self, block_width: usize, rows: usize) -> RowGeometry {
        let stride = self.layout.samples_per_block_pixel();
        RowGeometry {
            row_samples: block_width * stride,
            rows,
            stride,
        }
    }

    /// Band-1 sample of the `pixel`-th pixel in a block; sparse blocks read
    /// as the no-data value (or zero when none is declared)
    fn sample_at(&self, block: Option<&DecodedBlock>, pixel: usize) -> f64 {
        match block {
            Some(block) => {
                let size = self.layout.sample_type.bytes();
                let start = pixel * self.layout.samples_per_block_pixel() * size;
                self.layout.sample_type.decode(&block.data[start..start + size], block.byte_order)
            },
            None => self.layout.nodata.unwrap_or(0.0),
        }
    }

    /// Reads and fully decodes one block; `None` for a sparse block
    fn decode_block(&self, reader: &mut dyn SeekableReader, index: usize,
                    handler: &dyn CompressionHandler, geometry: RowGeometry,
                    file_size: u64) -> TiffResult<Option<DecodedBlock>> {
        let layout = self.layout;
        let offset = layout.block_offsets[index];
        let byte_count = layout.block_byte_counts[index];

        if offset == 0 && byte_count == 0 {
            trace!("Block {} is sparse", index);
            return Ok(None);
        }

        trace!("Reading block {} at offset {} with {} bytes", index, offset, byte_count);
        validation::validate_extent(offset, byte_count, file_size)?;
        reader.seek(SeekFrom::Start(offset))?;
        let mut compressed = vec![0u8; byte_count as usize];
        reader.read_exact(&mut compressed)?;

        let mut data = handler.decompress(&compressed)?;
        let expected = geometry.row_samples * geometry.rows * layout.sample_type.bytes();
        validation::validate_block_length(&data, expected)?;

        let byte_order = layout.predictor.decode(&mut data, geometry, layout.sample_type, layout.byte_order);
        Ok(Some(DecodedBlock { data, byte_order }))
    }
}
