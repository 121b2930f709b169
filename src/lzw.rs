//! Adaptive 9-12 bit LZW decoder
//!
//! Codes 0..255 are literals, two control codes clear the dictionary and end
//! the stream, and new entries start at 0x102. The code width grows by one
//! bit as soon as the dictionary size reaches `2^width`, up to 12 bits.

use crate::bits::{ByteCursor, CodeWordReader};
use crate::output::OutputBuffer;
use crate::{LzwMode, Result, SqzError, LZW_DICT_LIMIT, LZW_FIRST_FREE, LZW_MAX_WIDTH, LZW_MIN_WIDTH};

/// One generation of the LZW dictionary
///
/// A clear code replaces the whole table with a fresh one; entries are only
/// ever appended in between.
#[derive(Debug, Clone)]
pub struct Dictionary {
    entries: Vec<Vec<u8>>,
}

impl Dictionary {
    /// Fresh table: 256 single-byte entries plus the two control slots
    pub fn new() -> Self {
        let mut entries = Vec::with_capacity(LZW_DICT_LIMIT);
        entries.extend((0..=255u8).map(|b| vec![b]));
        // Control codes are never looked up
        entries.resize(LZW_FIRST_FREE, Vec::new());
        Self { entries }
    }

    /// Current dictionary size, i.e. the next code to be assigned
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; the literal entries are never removed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once all 4096 codes are assigned
    pub fn is_full(&self) -> bool {
        self.entries.len() >= LZW_DICT_LIMIT
    }

    /// Sequence for `code`, if assigned
    pub fn get(&self, code: u16) -> Option<&[u8]> {
        self.entries.get(code as usize).map(Vec::as_slice)
    }

    /// Append `dict[prev] + byte` as the next code
    fn push_extension(&mut self, prev: u16, byte: u8) {
        let mut entry = Vec::with_capacity(self.entries[prev as usize].len() + 1);
        entry.extend_from_slice(&self.entries[prev as usize]);
        entry.push(byte);
        self.entries.push(entry);
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

/// Step-wise LZW decoder
#[derive(Debug)]
pub struct LzwDecoder<'a> {
    reader: CodeWordReader<'a>,
    clear_code: u16,
    end_code: u16,
    dict: Dictionary,
    width: u32,
    /// Previous ordinary code; `None` right after a clear code
    prev: Option<u16>,
    finished: bool,
}

impl<'a> LzwDecoder<'a> {
    /// Prime the code reader from `cursor`
    pub fn new(cursor: ByteCursor<'a>, mode: LzwMode) -> Result<Self> {
        Ok(Self {
            reader: CodeWordReader::new(cursor)?,
            clear_code: mode.clear_code(),
            end_code: mode.end_code(),
            dict: Dictionary::new(),
            width: LZW_MIN_WIDTH,
            prev: None,
            finished: false,
        })
    }

    /// Current code width in bits
    pub fn code_width(&self) -> u32 {
        self.width
    }

    /// Current dictionary generation
    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// True once the end code has been read
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn reset(&mut self) {
        self.dict = Dictionary::new();
        self.width = LZW_MIN_WIDTH;
        self.prev = None;
    }

    /// Read and process one code word
    ///
    /// Returns `false` once the end code is reached.
    pub fn step(&mut self, output: &mut OutputBuffer) -> Result<bool> {
        if self.finished {
            return Ok(false);
        }

        let code = self.reader.read_code(self.width)?;
        if code == self.end_code {
            log::trace!("LZW end code at output offset {}", output.position());
            self.finished = true;
            return Ok(false);
        }
        if code == self.clear_code {
            log::trace!("LZW clear code at output offset {}", output.position());
            self.reset();
            return Ok(true);
        }

        let size = self.dict.len();
        let first_byte = if (code as usize) < size {
            self.dict.entries[code as usize][0]
        } else {
            // Only the code about to be assigned may appear unassigned, and
            // only when there is a previous code to build it from
            let Some(prev) = self.prev else {
                return Err(SqzError::CorruptStream(format!(
                    "LZW code {code:#x} right after clear"
                )));
            };
            if self.dict.is_full() {
                return Err(SqzError::CorruptStream(format!(
                    "LZW code {code:#x} with full dictionary"
                )));
            }
            if code as usize != size {
                return Err(SqzError::CorruptStream(format!(
                    "LZW code {code:#x} beyond dictionary size {size:#x}"
                )));
            }
            self.dict.entries[prev as usize][0]
        };

        if let Some(prev) = self.prev {
            if !self.dict.is_full() {
                self.dict.push_extension(prev, first_byte);
                if self.dict.len() == 1 << self.width && self.width < LZW_MAX_WIDTH {
                    self.width += 1;
                }
            }
        }

        output.extend_from_slice(&self.dict.entries[code as usize])?;
        self.prev = Some(code);
        Ok(true)
    }

    /// Decode until the end code
    pub fn decode_into(&mut self, output: &mut OutputBuffer) -> Result<()> {
        while self.step(output)? {}
        Ok(())
    }
}

/// Decode an LZW stream starting at `cursor` into `output`
pub fn decode(cursor: ByteCursor<'_>, mode: LzwMode, output: &mut OutputBuffer) -> Result<()> {
    LzwDecoder::new(cursor, mode)?.decode_into(output)
}
