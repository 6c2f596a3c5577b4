//! TIFF predictors
//!
//! Predictors are applied per row of a strip or tile, after decompression.
//! `stride` is the distance between consecutive samples of the same band:
//! the samples per pixel for chunky data, 1 for planar data.

use byteorder::{BigEndian, LittleEndian};
use byteorder::ByteOrder as Endian;
use log::trace;

use crate::io::byte_order::ByteOrder;
use crate::raster::sample::SampleType;
use crate::tiff::constants::predictor;
use crate::tiff::errors::{TiffError, TiffResult};

/// Predictor declared by the Predictor tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predictor {
    None,
    Horizontal,
    FloatingPoint,
}

/// Geometry of the rows a predictor runs over
#[derive(Debug, Clone, Copy)]
pub struct RowGeometry {
    /// Samples in one row (pixels times stride)
    pub row_samples: usize,
    pub rows: usize,
    pub stride: usize,
}

impl RowGeometry {
    fn row_bytes(&self, sample_type: SampleType) -> usize {
        self.row_samples * sample_type.bytes()
    }
}

impl Predictor {
    /// Resolves the predictor for a band of the given sample type
    pub fn from_code(code: u64, sample_type: SampleType) -> TiffResult<Self> {
        match u16::try_from(code) {
            Ok(predictor::NONE) => Ok(Predictor::None),
            Ok(predictor::HORIZONTAL_DIFFERENCING) => Ok(Predictor::Horizontal),
            Ok(predictor::FLOATING_POINT) if sample_type.is_float() => Ok(Predictor::FloatingPoint),
            _ => Err(TiffError::UnsupportedPredictor(code)),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            Predictor::None => predictor::NONE,
            Predictor::Horizontal => predictor::HORIZONTAL_DIFFERENCING,
            Predictor::FloatingPoint => predictor::FLOATING_POINT,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Predictor::None => "None",
            Predictor::Horizontal => "Horizontal differencing",
            Predictor::FloatingPoint => "Floating point",
        }
    }

    /// Reverses the predictor in place
    ///
    /// Returns the byte order the samples are in afterwards: the floating
    /// point predictor always reassembles samples most significant byte first.
    pub fn decode(&self, data: &mut [u8], geometry: RowGeometry, sample_type: SampleType,
                  order: ByteOrder) -> ByteOrder {
        match self {
            Predictor::None => order,
            Predictor::Horizontal => {
                match order {
                    ByteOrder::LittleEndian => accumulate::<LittleEndian>(data, geometry, sample_type),
                    ByteOrder::BigEndian => accumulate::<BigEndian>(data, geometry, sample_type),
                }
                order
            },
            Predictor::FloatingPoint => {
                accumulate_floating_point(data, geometry, sample_type);
                ByteOrder::BigEndian
            },
        }
    }

    /// Applies the predictor in place, the inverse of `decode`
    ///
    /// For the floating point predictor the samples must already be in
    /// big-endian order.
    pub fn encode(&self, data: &mut [u8], geometry: RowGeometry, sample_type: SampleType, order: ByteOrder) {
        match self {
            Predictor::None => {},
            Predictor::Horizontal => match order {
                ByteOrder::LittleEndian => differentiate::<LittleEndian>(data, geometry, sample_type),
                ByteOrder::BigEndian => differentiate::<BigEndian>(data, geometry, sample_type),
            },
            Predictor::FloatingPoint => differentiate_floating_point(data, geometry, sample_type),
        }
    }
}

fn sample_mask(size: usize) -> u64 {
    if size >= 8 {
        u64::MAX
    } else {
        (1u64 << (size * 8)) - 1
    }
}

fn accumulate<E: Endian>(data: &mut [u8], geometry: RowGeometry, sample_type: SampleType) {
    let size = sample_type.bytes();
    let mask = sample_mask(size);
    let row_bytes = geometry.row_bytes(sample_type);
    if row_bytes == 0 {
        return;
    }

    for row in data.chunks_exact_mut(row_bytes).take(geometry.rows) {
        for i in geometry.stride..geometry.row_samples {
            let previous = E::read_uint(&row[(i - geometry.stride) * size..], size);
            let current = E::read_uint(&row[i * size..], size);
            E::write_uint(&mut row[i * size..], current.wrapping_add(previous) & mask, size);
        }
    }
    trace!("Reversed horizontal predictor over {} rows", geometry.rows);
}

fn differentiate<E: Endian>(data: &mut [u8], geometry: RowGeometry, sample_type: SampleType) {
    let size = sample_type.bytes();
    let mask = sample_mask(size);
    let row_bytes = geometry.row_bytes(sample_type);
    if row_bytes == 0 {
        return;
    }

    for row in data.chunks_exact_mut(row_bytes).take(geometry.rows) {
        for i in (geometry.stride..geometry.row_samples).rev() {
            let previous = E::read_uint(&row[(i - geometry.stride) * size..], size);
            let current = E::read_uint(&row[i * size..], size);
            E::write_uint(&mut row[i * size..], current.wrapping_sub(previous) & mask, size);
        }
    }
}

/// Byte-wise accumulation followed by regrouping of the byte planes
///
/// Each row stores all most significant bytes first, then the next byte
/// plane and so on; the differences run over that byte stream.
fn accumulate_floating_point(data: &mut [u8], geometry: RowGeometry, sample_type: SampleType) {
    let size = sample_type.bytes();
    let row_bytes = geometry.row_bytes(sample_type);
    if row_bytes == 0 {
        return;
    }

    for row in data.chunks_exact_mut(row_bytes).take(geometry.rows) {
        for i in geometry.stride..row_bytes {
            row[i] = row[i].wrapping_add(row[i - geometry.stride]);
        }

        let planes = row.to_vec();
        for sample in 0..geometry.row_samples {
            for byte in 0..size {
                row[sample * size + byte] = planes[byte * geometry.row_samples + sample];
            }
        }
    }
    trace!("Reversed floating point predictor over {} rows", geometry.rows);
}

fn differentiate_floating_point(data: &mut [u8], geometry: RowGeometry, sample_type: SampleType) {
    let size = sample_type.bytes();
    let row_bytes = geometry.row_bytes(sample_type);
    if row_bytes == 0 {
        return;
    }

    for row in data.chunks_exact_mut(row_bytes).take(geometry.rows) {
        let samples = row.to_vec();
        for sample in 0..geometry.row_samples {
            for byte in 0..size {
                row[byte * geometry.row_samples + sample] = samples[sample * size + byte];
            }
        }

        for i in (geometry.stride..row_bytes).rev() {
            row[i] = row[i].wrapping_sub(row[i - geometry.stride]);
        }
    }
}
