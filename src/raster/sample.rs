//! Sample type resolution and numeric decoding
//!
//! A band's sample type is the pair (BitsPerSample, SampleFormat). Every
//! supported combination decodes to `f64`, which holds all of them exactly
//! except the extremes of 32-bit integers, which it still holds exactly.

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use byteorder::ByteOrder as Endian;
use std::fmt;
use std::io;

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::sample_format;
use crate::tiff::errors::{TiffError, TiffResult};

/// Numeric type of one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl SampleType {
    /// Resolves the sample type from BitsPerSample and SampleFormat
    ///
    /// `VOID` (4) data is treated as unsigned, which is what GDAL does.
    pub fn from_tags(bits: u64, format: u64) -> TiffResult<Self> {
        let unsupported = TiffError::UnsupportedSampleFormat { bits, format };
        let format = u16::try_from(format).map_err(|_| TiffError::UnsupportedSampleFormat { bits, format })?;

        match (bits, format) {
            (8, sample_format::UNSIGNED) | (8, sample_format::VOID) => Ok(SampleType::U8),
            (8, sample_format::SIGNED) => Ok(SampleType::I8),
            (16, sample_format::UNSIGNED) | (16, sample_format::VOID) => Ok(SampleType::U16),
            (16, sample_format::SIGNED) => Ok(SampleType::I16),
            (32, sample_format::UNSIGNED) | (32, sample_format::VOID) => Ok(SampleType::U32),
            (32, sample_format::SIGNED) => Ok(SampleType::I32),
            (32, sample_format::IEEEFP) => Ok(SampleType::F32),
            (64, sample_format::IEEEFP) => Ok(SampleType::F64),
            _ => Err(unsupported),
        }
    }

    /// Size of one sample in bytes
    pub fn bytes(&self) -> usize {
        match self {
            SampleType::U8 | SampleType::I8 => 1,
            SampleType::U16 | SampleType::I16 => 2,
            SampleType::U32 | SampleType::I32 | SampleType::F32 => 4,
            SampleType::F64 => 8,
        }
    }

    pub fn bits(&self) -> u16 {
        self.bytes() as u16 * 8
    }

    pub fn is_float(&self) -> bool {
        matches!(self, SampleType::F32 | SampleType::F64)
    }

    /// SampleFormat tag value for this type
    pub fn format_code(&self) -> u16 {
        match self {
            SampleType::U8 | SampleType::U16 | SampleType::U32 => sample_format::UNSIGNED,
            SampleType::I8 | SampleType::I16 | SampleType::I32 => sample_format::SIGNED,
            SampleType::F32 | SampleType::F64 => sample_format::IEEEFP,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SampleType::U8 => "UInt8",
            SampleType::I8 => "Int8",
            SampleType::U16 => "UInt16",
            SampleType::I16 => "Int16",
            SampleType::U32 => "UInt32",
            SampleType::I32 => "Int32",
            SampleType::F32 => "Float32",
            SampleType::F64 => "Float64",
        }
    }

    /// Rounds a value to what this type can hold
    ///
    /// A no-data sentinel declared as text must be compared at the band's
    /// precision: "-0.1" only matches Float32 samples once rounded to f32.
    pub fn normalize(&self, value: f64) -> f64 {
        match self {
            SampleType::F32 => value as f32 as f64,
            _ => value,
        }
    }

    /// Decodes one sample; `bytes` must hold at least `self.bytes()` bytes
    pub fn decode(&self, bytes: &[u8], order: ByteOrder) -> f64 {
        match order {
            ByteOrder::LittleEndian => self.decode_with::<LittleEndian>(bytes),
            ByteOrder::BigEndian => self.decode_with::<BigEndian>(bytes),
        }
    }

    fn decode_with<E: Endian>(&self, bytes: &[u8]) -> f64 {
        match self {
            SampleType::U8 => bytes[0] as f64,
            SampleType::I8 => bytes[0] as i8 as f64,
            SampleType::U16 => E::read_u16(bytes) as f64,
            SampleType::I16 => E::read_i16(bytes) as f64,
            SampleType::U32 => E::read_u32(bytes) as f64,
            SampleType::I32 => E::read_i32(bytes) as f64,
            SampleType::F32 => E::read_f32(bytes) as f64,
            SampleType::F64 => E::read_f64(bytes),
        }
    }

    /// Appends one sample encoded in the given byte order
    ///
    /// Integer types saturate at their range, as `as` casts from `f64` do.
    pub fn encode(&self, value: f64, order: ByteOrder, out: &mut Vec<u8>) -> io::Result<()> {
        match order {
            ByteOrder::LittleEndian => self.encode_with::<LittleEndian>(value, out),
            ByteOrder::BigEndian => self.encode_with::<BigEndian>(value, out),
        }
    }

    fn encode_with<E: Endian>(&self, value: f64, out: &mut Vec<u8>) -> io::Result<()> {
        match self {
            SampleType::U8 => out.write_u8(value as u8),
            SampleType::I8 => out.write_i8(value as i8),
            SampleType::U16 => out.write_u16::<E>(value as u16),
            SampleType::I16 => out.write_i16::<E>(value as i16),
            SampleType::U32 => out.write_u32::<E>(value as u32),
            SampleType::I32 => out.write_i32::<E>(value as i32),
            SampleType::F32 => out.write_f32::<E>(value as f32),
            SampleType::F64 => out.write_f64::<E>(value),
        }
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
