//! TIFF file reader implementation
//!
//! This module implements the TIFF/BigTIFF file reader that uses the
//! Strategy pattern to handle different byte orders.

use byteorder::ReadBytesExt;
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::io::seekable::SeekableReader;
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::types::TIFF;
use crate::tiff::validation;
use crate::utils::format_utils;
use crate::utils::ifd_utils;
use crate::utils::tag_utils;

/// Upper bound on the IFD chain length, guards against offset loops
const MAX_IFDS: usize = 100;

/// Reader for TIFF and BigTIFF files
#[derive(Default)]
pub struct TiffReader {
    /// Current byte order handler
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Current file path
    current_file: Option<PathBuf>,
    /// Whether currently reading BigTIFF format
    is_big_tiff: bool,
}

impl TiffReader {
    /// Creates a new TIFF reader
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the byte order handler, or an error before a header was read
    pub fn handler(&self) -> TiffResult<&dyn ByteOrderHandler> {
        self.byte_order_handler.as_deref()
            .ok_or_else(|| TiffError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Opens a buffered reader on the most recently loaded file
    pub fn open_current(&self) -> TiffResult<BufReader<File>> {
        match &self.current_file {
            Some(path) => Ok(BufReader::with_capacity(1024 * 1024, File::open(path)?)),
            None => Err(TiffError::GenericError("No file path specified".to_string()))
        }
    }

    /// Loads a TIFF file from the given path
    ///
    /// This is the main entry point for loading a TIFF file.
    /// It opens the file and delegates to the read() method.
    pub fn load(&mut self, filepath: &Path) -> TiffResult<TIFF> {
        info!("Loading TIFF file: {}", filepath.display());
        self.current_file = Some(filepath.to_path_buf());

        let file = File::open(filepath)?;
        let mut reader = BufReader::with_capacity(1024 * 1024, file);

        self.read(&mut reader)
    }

    /// Reads a TIFF file from the given reader
    ///
    /// 1. Detect byte order (little/big endian)
    /// 2. Check for TIFF or BigTIFF format
    /// 3. Read all IFDs (Image File Directories)
    ///
    /// Fails when not even the first IFD can be read.
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> TiffResult<TIFF> {
        reader.seek(SeekFrom::Start(0))?;

        let handler = format_utils::detect_byte_order(reader)?;
        let (is_big_tiff, _) = format_utils::detect_tiff_format(reader, handler.as_ref())?;
        let first_ifd_offset = ifd_utils::read_ifd_offset(reader, is_big_tiff, handler.as_ref())?;
        debug!("First IFD offset: {}", first_ifd_offset);

        let byte_order = handler.order();
        self.byte_order_handler = Some(handler);
        self.is_big_tiff = is_big_tiff;

        let file_size = validation::get_file_size(reader)?;
        validation::validate_ifd_offset(first_ifd_offset, file_size)?;

        let mut tiff = TIFF::new(is_big_tiff, byte_order);
        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset, file_size)?;

        debug!("Read {} IFDs from TIFF file", tiff.ifds.len());
        Ok(tiff)
    }

    /// Reads a chain of IFDs starting from the given offset
    ///
    /// Errors past the first IFD end the chain with a warning; the
    /// directories read so far are kept.
    fn read_ifd_chain(&self, reader: &mut dyn SeekableReader, first_ifd_offset: u64,
                      file_size: u64) -> TiffResult<Vec<IFD>> {
        let handler = self.handler()?;
        let mut ifds = Vec::new();
        let mut ifd_offset = first_ifd_offset;

        while ifd_offset != 0 && ifds.len() < MAX_IFDS {
            let ifd_number = ifds.len();

            if ifd_offset >= file_size {
                warn!("IFD offset {} exceeds file size {}, stopping IFD chain", ifd_offset, file_size);
                break;
            }

            let ifd = match self.read_ifd(reader, ifd_offset, ifd_number) {
                Ok(ifd) => ifd,
                Err(e) if ifd_number == 0 => return Err(e),
                Err(e) => {
                    warn!("Error reading IFD {}: {}", ifd_number, e);
                    break;
                }
            };

            let next_offset_position = ifd_offset + ifd_utils::calculate_ifd_size(&ifd, self.is_big_tiff);
            let next_ifd_offset = reader.seek(SeekFrom::Start(next_offset_position))
                .map_err(TiffError::from)
                .and_then(|_| ifd_utils::read_ifd_offset(reader, self.is_big_tiff, handler));

            ifds.push(ifd);

            match next_ifd_offset {
                Ok(next) if next != 0 && (next >= file_size || next < 8) => {
                    warn!("Invalid next IFD offset: {}, stopping IFD chain", next);
                    break;
                },
                Ok(next) => ifd_offset = next,
                Err(e) => {
                    warn!("Error reading next IFD offset: {}", e);
                    break;
                }
            }
        }

        Ok(ifds)
    }

    /// Reads an IFD from the reader
    ///
    /// An IFD consists of an entry count followed by that many tag entries.
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> TiffResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;

        let entry_count = self.read_ifd_entry_count(reader)?;
        debug!("IFD #{} entry count: {}", number, entry_count);

        let mut ifd = IFD::new(number, offset);

        for _ in 0..entry_count {
            let entry = self.read_ifd_entry(reader)?;
            ifd.add_entry(entry);
        }

        Ok(ifd)
    }

    /// Reads the entry count from an IFD
    fn read_ifd_entry_count(&self, reader: &mut dyn SeekableReader) -> TiffResult<u64> {
        let handler = self.handler()?;
        if self.is_big_tiff {
            handler.read_u64(reader).map_err(TiffError::IoError)
        } else {
            handler.read_u16(reader)
                .map(|v| v as u64)
                .map_err(TiffError::IoError)
        }
    }

    /// Reads a single IFD entry
    ///
    /// A single inline value is decoded at its own width so that, for
    /// example, a SHORT image width in a big-endian file is not read as the
    /// high half of a 32-bit word.
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> TiffResult<IFDEntry> {
        let handler = self.handler()?;

        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let field_width = if self.is_big_tiff { 8 } else { 4 };
        let mut field = vec![0u8; field_width];
        reader.read_exact(&mut field)?;

        let value_size = IFDEntry::new(tag, field_type, count, 0).value_size();
        let mut cursor = Cursor::new(field);

        let value_offset = if count == 1 && value_size <= field_width {
            match value_size {
                1 => cursor.read_u8()? as u64,
                2 => handler.read_u16(&mut cursor)? as u64,
                4 => handler.read_u32(&mut cursor)? as u64,
                _ => handler.read_u64(&mut cursor)?,
            }
        } else if self.is_big_tiff {
            handler.read_u64(&mut cursor)?
        } else {
            handler.read_u32(&mut cursor)? as u64
        };

        Ok(IFDEntry::new(tag, field_type, count, value_offset))
    }

    /// Reads the raw bytes of an entry's value array
    ///
    /// Inline arrays are rebuilt from the entry itself, others are read from
    /// their offset in the file.
    pub fn read_entry_bytes(&self, reader: &mut dyn SeekableReader, entry: &IFDEntry) -> TiffResult<Vec<u8>> {
        let handler = self.handler()?;
        let size = entry.checked_value_size().ok_or_else(|| TiffError::GenericError(
            format!("Value array of tag {} overflows ({} values)", entry.tag, entry.count)))?;

        if entry.is_value_inline(self.is_big_tiff) {
            let width = if entry.count == 1 {
                size
            } else if self.is_big_tiff {
                8
            } else {
                4
            };
            let mut bytes = handler.inline_bytes(entry.value_offset, width);
            bytes.truncate(size);
            Ok(bytes)
        } else {
            let file_size = validation::get_file_size(reader)?;
            validation::validate_extent(entry.value_offset, size as u64, file_size)?;

            reader.seek(SeekFrom::Start(entry.value_offset))?;
            let mut buffer = vec![0u8; size];
            reader.read_exact(&mut buffer)?;
            Ok(buffer)
        }
    }

    /// Reads a tag's value as a vector of u64
    ///
    /// Handles every integer field type, inline or not, in either byte order.
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<u64>> {
        let entry = ifd.get_entry(tag)
            .ok_or(TiffError::TagNotFound(tag))?;

        let bytes = self.read_entry_bytes(reader, entry)?;
        let mut values = Vec::with_capacity(entry.count as usize);
        tag_utils::read_tag_value_array(&mut Cursor::new(bytes), entry, self.handler()?, &mut values)?;

        Ok(values)
    }

    /// Reads an integer array tag, falling back to `default` when absent
    pub fn read_tag_values_or(&self, reader: &mut dyn SeekableReader, ifd: &IFD,
                              tag: u16, default: u64) -> TiffResult<Vec<u64>> {
        if ifd.has_tag(tag) {
            self.read_tag_values(reader, ifd, tag)
        } else {
            Ok(vec![default])
        }
    }

    /// Reads an ASCII tag, returning `None` when the IFD lacks it
    pub fn read_ascii_tag(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Option<String>> {
        match ifd.get_entry(tag) {
            Some(entry) => {
                let bytes = self.read_entry_bytes(reader, entry)?;
                tag_utils::decode_ascii(bytes).map(Some)
            },
            None => Ok(None),
        }
    }

    /// Returns whether the current file is a BigTIFF
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    /// Byte order of the current file, once a header has been read
    pub fn byte_order(&self) -> Option<ByteOrder> {
        self.byte_order_handler.as_ref().map(|handler| handler.order())
    }
}
