//! Byte cursor and bit readers
//!
//! Three bit orders are in use by the packed formats:
//! - [`MsbBitReader`]: one byte at a time, most significant bit first
//!   (Huffman codewords).
//! - [`CodeWordReader`]: 24-bit shift buffer fed a byte at a time, returning
//!   9-12 bit LZW codes from the top.
//! - [`WordBitReader`]: 16-bit little-endian words consumed least significant
//!   bit first, with raw bytes interleaved in the same stream (DIET).

use crate::{Result, SqzError, LZW_MAX_WIDTH};

/// Forward-only cursor over a byte slice
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True once every byte has been consumed
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Read one byte, or `None` at end of input
    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = self.data.get(self.pos).copied()?;
        self.pos += 1;
        Some(byte)
    }

    /// Read one byte, failing with `UnexpectedEof` naming `what`
    pub fn read_u8(&mut self, what: &'static str) -> Result<u8> {
        self.next_byte().ok_or(SqzError::UnexpectedEof(what))
    }

    /// Read a little-endian 16-bit value
    pub fn read_u16_le(&mut self, what: &'static str) -> Result<u16> {
        if self.remaining() < 2 {
            return Err(SqzError::UnexpectedEof(what));
        }
        let value = u16::from_le_bytes([self.data[self.pos], self.data[self.pos + 1]]);
        self.pos += 2;
        Ok(value)
    }
}

/// MSB-first bit reader
///
/// A new byte is fetched only when the previous one is used up, so end of
/// stream is only observable on a byte boundary.
#[derive(Debug)]
pub struct MsbBitReader<'a> {
    cursor: ByteCursor<'a>,
    current: u8,
    bit: u32,
}

impl<'a> MsbBitReader<'a> {
    /// Start reading bits at the cursor's current position
    pub fn new(cursor: ByteCursor<'a>) -> Self {
        Self {
            cursor,
            current: 0,
            bit: 8,
        }
    }

    /// True when the current byte is used up and no input is left
    pub fn is_end_of_stream(&self) -> bool {
        self.bit == 8 && self.cursor.is_empty()
    }

    /// Read one bit, or `None` at end of stream
    pub fn read_bit(&mut self) -> Option<bool> {
        if self.bit == 8 {
            self.current = self.cursor.next_byte()?;
            self.bit = 0;
        }
        let value = self.current & (0x80 >> self.bit) != 0;
        self.bit += 1;
        Some(value)
    }
}

/// LZW code word reader over a 24-bit shift buffer
///
/// Codes are taken from the top of the buffer. Consumed bits leave a hole at
/// the bottom which is refilled a whole byte at a time while input remains.
#[derive(Debug)]
pub struct CodeWordReader<'a> {
    cursor: ByteCursor<'a>,
    buf24: u32,
    missing_bits: u32,
}

impl<'a> CodeWordReader<'a> {
    /// Prime the buffer with the next three bytes
    pub fn new(mut cursor: ByteCursor<'a>) -> Result<Self> {
        let mut buf24 = 0u32;
        for _ in 0..3 {
            buf24 = (buf24 << 8) | cursor.read_u8("LZW code buffer")? as u32;
        }
        Ok(Self {
            cursor,
            buf24,
            missing_bits: 0,
        })
    }

    /// Read a `width`-bit code word
    pub fn read_code(&mut self, width: u32) -> Result<u16> {
        if width > LZW_MAX_WIDTH {
            return Err(SqzError::CorruptStream(format!(
                "LZW code width {width} exceeds {LZW_MAX_WIDTH} bits"
            )));
        }
        if width > 24 - self.missing_bits {
            return Err(SqzError::UnexpectedEof("LZW code word"));
        }

        let code = self.buf24 >> (24 - width);
        self.buf24 = (self.buf24 << width) & 0xFF_FFFF;
        self.missing_bits += width;

        while self.missing_bits >= 8 {
            let Some(byte) = self.cursor.next_byte() else {
                break;
            };
            self.missing_bits -= 8;
            self.buf24 |= (byte as u32) << self.missing_bits;
        }

        Ok(code as u16)
    }
}

/// DIET bit reader: 16-bit LSB-first words with raw bytes in between
///
/// The first word is loaded on construction and the next one as soon as the
/// last bit of the current word is taken, so raw bytes read after that point
/// come from behind the freshly loaded word.
#[derive(Debug)]
pub struct WordBitReader<'a> {
    cursor: ByteCursor<'a>,
    word: u16,
    bits_left: u32,
}

impl<'a> WordBitReader<'a> {
    /// Load the first word from the cursor
    pub fn new(cursor: ByteCursor<'a>) -> Self {
        let mut reader = Self {
            cursor,
            word: 0,
            bits_left: 0,
        };
        reader.reload();
        reader
    }

    fn reload(&mut self) {
        // Fewer than two bytes: leave bits_left at zero so the next read fails
        if let Ok(word) = self.cursor.read_u16_le("DIET bit word") {
            self.word = word;
            self.bits_left = 16;
        }
    }

    /// Read one bit
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.bits_left == 0 {
            return Err(SqzError::UnexpectedEof("DIET bit stream"));
        }
        let bit = self.word & 1 != 0;
        self.word >>= 1;
        self.bits_left -= 1;
        if self.bits_left == 0 {
            self.reload();
        }
        Ok(bit)
    }

    /// Read `count` bits and assemble them first-bit-highest
    pub fn read_bits(&mut self, count: u32) -> Result<u32> {
        let mut value = 0;
        for _ in 0..count {
            value = (value << 1) | self.read_bit()? as u32;
        }
        Ok(value)
    }

    /// Read a raw byte from the stream, bypassing the bit buffer
    pub fn read_byte(&mut self) -> Result<u8> {
        self.cursor.read_u8("DIET raw byte")
    }
}

/// Pack `(code, width)` pairs MSB-first, zero-padding the last byte
#[cfg(test)]
pub(crate) fn pack_msb(codes: &[(u32, u32)]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut acc = 0u64;
    let mut nbits = 0u32;
    for &(code, width) in codes {
        acc = (acc << width) | code as u64;
        nbits += width;
        while nbits >= 8 {
            nbits -= 8;
            out.push((acc >> nbits) as u8);
        }
    }
    if nbits > 0 {
        out.push((acc << (8 - nbits)) as u8);
    }
    out
}
