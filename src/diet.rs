//! DIET sliding-window decoder
//!
//! The stream mixes control bits, taken LSB-first from 16-bit little-endian
//! words, with raw bytes read directly from the input. Each step is either a
//! run of literals (one `1` bit per raw byte) or a back-reference whose
//! low offset byte is raw and whose high offset byte and repeat count are
//! small prefix codes.
//!
//! Bit layout after the literal run's closing `0`:
//!
//! ```text
//! 0 <lo> 0                  distance 0xFF<lo>, 2 bytes (0xFFFF ends the stream)
//! 0 <lo> 1 vvv              distance ((0xF8|vvv)-1)<lo>, 2 bytes
//! 1 <lo> <high> <count>     long form, 3..272 bytes
//! ```

use crate::bits::{ByteCursor, WordBitReader};
use crate::output::OutputBuffer;
use crate::Result;

/// Decoder over one DIET stream
#[derive(Debug)]
pub struct DietDecoder<'a> {
    bits: WordBitReader<'a>,
}

impl<'a> DietDecoder<'a> {
    /// Start decoding at `cursor` (the byte after the header)
    pub fn new(cursor: ByteCursor<'a>) -> Self {
        Self {
            bits: WordBitReader::new(cursor),
        }
    }

    /// High offset byte of a long-form back-reference
    ///
    /// One bit is appended to `0xFF`. Unless the next bit is set, up to three
    /// more bits are appended, each but the last followed by a stop bit, and
    /// `2 + 4 + ...` is subtracted so the ranges for each length abut:
    /// `0xFE..=0xFF`, `0xFA..=0xFD`, `0xF2..=0xF9`, `0xE2..=0xF1`.
    fn read_long_high(&mut self) -> Result<u8> {
        let mut high = (0xFFu32 << 1) | self.bits.read_bit()? as u32;
        if self.bits.read_bit()? {
            return Ok(high as u8);
        }

        let mut correction = 0u32;
        for i in 1..=3 {
            high = (high << 1) | self.bits.read_bit()? as u32;
            correction += 1 << i;
            if i < 3 && self.bits.read_bit()? {
                break;
            }
        }
        Ok((high - correction) as u8)
    }

    /// Extra repeat count of a long-form back-reference (1..=270)
    fn read_long_count(&mut self) -> Result<usize> {
        for n in 1..=4 {
            if self.bits.read_bit()? {
                return Ok(n);
            }
        }
        if self.bits.read_bit()? {
            return Ok(5 + self.bits.read_bit()? as usize);
        }
        if self.bits.read_bit()? {
            return Ok(7 + self.bits.read_bits(3)? as usize);
        }
        Ok(15 + self.bits.read_byte()? as usize)
    }

    /// Decode until the end marker
    pub fn decode_into(&mut self, output: &mut OutputBuffer) -> Result<()> {
        loop {
            while self.bits.read_bit()? {
                let byte = self.bits.read_byte()?;
                output.push(byte)?;
            }

            let long_form = self.bits.read_bit()?;
            let low = self.bits.read_byte()?;

            let (high, count) = if long_form {
                let high = self.read_long_high()?;
                (high, 2 + self.read_long_count()?)
            } else if self.bits.read_bit()? {
                let high = (0xF8 | self.bits.read_bits(3)? as u8).wrapping_sub(1);
                (high, 2)
            } else {
                if low == 0xFF {
                    log::trace!("DIET end marker at output offset {}", output.position());
                    return Ok(());
                }
                (0xFF, 2)
            };

            // Two's complement 16-bit distance, always negative
            let distance = 0x1_0000 - (((high as usize) << 8) | low as usize);
            output.copy_back(distance, count)?;
        }
    }
}

/// Decode a DIET stream starting at `cursor` into `output`
pub fn decode(cursor: ByteCursor<'_>, output: &mut OutputBuffer) -> Result<()> {
    DietDecoder::new(cursor).decode_into(output)
}
