//! Handler for PackBits (Macintosh RLE) compressed data

use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;

/// Longest run either kind of packet can describe
const MAX_RUN: usize = 128;

/// PackBits compression handler (compression code 32773)
pub struct PackBitsHandler;

impl CompressionHandler for PackBitsHandler {
    fn decompress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut output = Vec::with_capacity(data.len() * 2);
        let mut position = 0;

        while position < data.len() {
            let header = data[position] as i8;
            position += 1;

            match header {
                // No-op packet
                -128 => {},
                0..=127 => {
                    let length = header as usize + 1;
                    let literal = data.get(position..position + length)
                        .ok_or_else(|| TiffError::GenericError(
                            "PackBits literal run past end of data".to_string()))?;
                    output.extend_from_slice(literal);
                    position += length;
                },
                _ => {
                    let length = (1 - header as isize) as usize;
                    let value = *data.get(position)
                        .ok_or_else(|| TiffError::GenericError(
                            "PackBits repeat run past end of data".to_string()))?;
                    output.extend(std::iter::repeat(value).take(length));
                    position += 1;
                }
            }
        }

        Ok(output)
    }

    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut output = Vec::with_capacity(data.len() + data.len() / MAX_RUN + 1);
        let mut literal_start = 0;
        let mut position = 0;

        while position < data.len() {
            let value = data[position];
            let mut run = 1;
            while position + run < data.len() && data[position + run] == value && run < MAX_RUN {
                run += 1;
            }

            if run >= 3 {
                flush_literals(&mut output, &data[literal_start..position]);
                output.push((1 - run as isize) as i8 as u8);
                output.push(value);
                position += run;
                literal_start = position;
            } else {
                position += run;
            }
        }
        flush_literals(&mut output, &data[literal_start..]);

        Ok(output)
    }

    fn name(&self) -> &'static str {
        "PackBits"
    }

    fn code(&self) -> u64 {
        32773
    }
}

fn flush_literals(output: &mut Vec<u8>, literals: &[u8]) {
    for chunk in literals.chunks(MAX_RUN) {
        output.push((chunk.len() - 1) as u8);
        output.extend_from_slice(chunk);
    }
}
