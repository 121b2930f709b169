//! Fixture builders shared by the integration tests
//!
//! The crate only decompresses, so tests build packed inputs with the small
//! encoders below. Each one mirrors exactly what the decoder expects.

#![allow(dead_code)]

use std::collections::HashMap;

/// MSB-first bit packer
#[derive(Default)]
pub struct MsbWriter {
    out: Vec<u8>,
    acc: u64,
    nbits: u32,
}

impl MsbWriter {
    pub fn put(&mut self, value: u32, width: u32) {
        self.acc = (self.acc << width) | value as u64;
        self.nbits += width;
        while self.nbits >= 8 {
            self.nbits -= 8;
            self.out.push((self.acc >> self.nbits) as u8);
        }
    }

    /// Flush, padding the last byte with `pad` bits
    pub fn finish(mut self, pad: bool) -> Vec<u8> {
        if self.nbits > 0 {
            let fill = 8 - self.nbits;
            let bits = if pad { (1u32 << fill) - 1 } else { 0 };
            self.put(bits, fill);
        }
        self.out
    }
}

/// 4-byte container header
pub fn container_header(format_byte: u8, payload_size: usize) -> Vec<u8> {
    let mut header = vec![((payload_size >> 16) & 0x0F) as u8, format_byte];
    header.extend_from_slice(&((payload_size & 0xFFFF) as u16).to_le_bytes());
    header
}

/// Greedy LZW encoder following the decoder's dictionary and width rules
///
/// `clear_every` inserts a clear code after that many codes to exercise
/// dictionary resets.
pub fn lzw_encode(data: &[u8], clear: u32, end: u32, clear_every: Option<usize>) -> Vec<u8> {
    let mut writer = MsbWriter::default();

    let fresh = || -> HashMap<Vec<u8>, u32> { (0..=255u8).map(|b| (vec![b], b as u32)).collect() };
    let mut dict = fresh();
    let mut next_code = 0x102u32;
    // Decoder-side size and width: one entry behind the encoder
    let mut dec_size = 0x102u32;
    let mut width = 9u32;
    let mut codes_in_generation = 0usize;

    let mut w: Vec<u8> = Vec::new();
    let mut i = 0;
    while i < data.len() {
        let mut candidate = w.clone();
        candidate.push(data[i]);
        if w.is_empty() || dict.contains_key(&candidate) {
            w = candidate;
            i += 1;
            continue;
        }

        writer.put(dict[&w], width);
        if codes_in_generation > 0 && dec_size < 0x1000 {
            dec_size += 1;
            if dec_size == 1 << width && width < 12 {
                width += 1;
            }
        }
        codes_in_generation += 1;
        if next_code < 0x1000 {
            dict.insert(candidate, next_code);
            next_code += 1;
        }
        w.clear();

        if clear_every.is_some_and(|n| codes_in_generation >= n) {
            writer.put(clear, width);
            dict = fresh();
            next_code = 0x102;
            dec_size = 0x102;
            width = 9;
            codes_in_generation = 0;
        }
    }

    if !w.is_empty() {
        writer.put(dict[&w], width);
        if codes_in_generation > 0 && dec_size < 0x1000 {
            dec_size += 1;
            if dec_size == 1 << width && width < 12 {
                width += 1;
            }
        }
    }
    writer.put(end, width);

    let mut out = writer.finish(false);
    out.resize(out.len().max(3), 0);
    out
}

/// LZW container with the standard control codes
pub fn lzw_container(data: &[u8]) -> Vec<u8> {
    let mut blob = container_header(0x10, data.len());
    blob.extend(lzw_encode(data, 0x100, 0x101, None));
    blob
}

/// Huffman tree over `symbols` plus a chain of 1-branches that no padding
/// can complete, with the code of every symbol
pub struct HuffmanFixture {
    pub records: Vec<u16>,
    pub codes: HashMap<u16, Vec<bool>>,
}

impl HuffmanFixture {
    pub fn new(symbols: &[u16]) -> Self {
        assert!(!symbols.is_empty());
        let mut fixture = Self {
            records: vec![0, 0],
            codes: HashMap::new(),
        };
        fixture.place(0, symbols, vec![false]);

        // Slot 1: chain of internal nodes along the 1-branch
        let mut slot = 1;
        for _ in 0..8 {
            let child = fixture.records.len();
            fixture.records[slot] = (child * 2) as u16;
            fixture.records.push(0x8000);
            fixture.records.push(0x8000);
            slot = child + 1;
        }
        fixture
    }

    fn place(&mut self, slot: usize, symbols: &[u16], path: Vec<bool>) {
        if symbols.len() == 1 {
            self.records[slot] = 0x8000 | symbols[0];
            self.codes.insert(symbols[0], path);
            return;
        }
        let child = self.records.len();
        self.records[slot] = (child * 2) as u16;
        self.records.push(0);
        self.records.push(0);
        let (left, right) = symbols.split_at(symbols.len() / 2);
        let mut left_path = path.clone();
        left_path.push(false);
        let mut right_path = path;
        right_path.push(true);
        self.place(child, left, left_path);
        self.place(child + 1, right, right_path);
    }

    /// Table size, records and the bit stream for `stream`
    pub fn encode(&self, stream: &[u16]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&((self.records.len() * 2) as u16).to_le_bytes());
        for record in &self.records {
            out.extend_from_slice(&record.to_le_bytes());
        }
        let mut writer = MsbWriter::default();
        for symbol in stream {
            for &bit in &self.codes[symbol] {
                writer.put(bit as u32, 1);
            }
        }
        out.extend(writer.finish(true));
        out
    }
}

/// Huffman+RLE container from a symbol stream
pub fn huffman_container(payload_size: usize, stream: &[u16]) -> Vec<u8> {
    let mut symbols: Vec<u16> = stream.to_vec();
    symbols.sort_unstable();
    symbols.dedup();
    let fixture = HuffmanFixture::new(&symbols);

    let mut blob = container_header(0x00, payload_size);
    blob.extend(fixture.encode(stream));
    blob
}

/// DIET stream writer mirroring the decoder's eager word reload
pub struct DietWriter {
    pub out: Vec<u8>,
    word_pos: usize,
    nbits: u32,
}

impl Default for DietWriter {
    fn default() -> Self {
        Self {
            out: vec![0, 0],
            word_pos: 0,
            nbits: 0,
        }
    }
}

impl DietWriter {
    pub fn bit(&mut self, bit: bool) {
        if bit {
            self.out[self.word_pos + (self.nbits / 8) as usize] |= 1 << (self.nbits % 8);
        }
        self.nbits += 1;
        if self.nbits == 16 {
            self.word_pos = self.out.len();
            self.out.extend_from_slice(&[0, 0]);
            self.nbits = 0;
        }
    }

    /// Write `count` bits of `value`, highest first
    pub fn bits(&mut self, value: u32, count: u32) {
        for i in (0..count).rev() {
            self.bit(value >> i & 1 != 0);
        }
    }

    pub fn byte(&mut self, byte: u8) {
        self.out.push(byte);
    }

    pub fn literal(&mut self, byte: u8) {
        self.bit(true);
        self.byte(byte);
    }

    /// Back-reference `distance` bytes back, `count` bytes long
    ///
    /// Picks the short form for 2-byte copies within reach, the long form
    /// otherwise.
    pub fn reference(&mut self, distance: usize, count: usize) {
        assert!(distance >= 1);
        let offset = 0x1_0000 - distance;
        let high = (offset >> 8) as u8;
        let low = (offset & 0xFF) as u8;

        self.bit(false);
        if count == 2 && high >= 0xF7 && !(high == 0xFF && low == 0xFF) {
            self.bit(false);
            self.byte(low);
            if high == 0xFF {
                self.bit(false);
            } else {
                self.bit(true);
                self.bits(((high as u32) + 1) & 7, 3);
            }
            return;
        }

        assert!(high >= 0xE2, "distance {distance} out of range");
        assert!((3..=272).contains(&count), "count {count} needs the long form");
        self.bit(true);
        self.byte(low);
        self.long_high(high);
        self.long_count(count - 2);
    }

    fn long_high(&mut self, high: u8) {
        match high {
            0xFE..=0xFF => {
                self.bit(high & 1 != 0);
                self.bit(true);
            }
            0xFA..=0xFD => {
                let v = (high as u32 + 2) & 0x3;
                self.bit(v >> 1 != 0);
                self.bit(false);
                self.bit(v & 1 != 0);
                self.bit(true);
            }
            0xF2..=0xF9 => {
                let v = (high as u32 + 6) & 0x7;
                self.bit(v >> 2 != 0);
                self.bit(false);
                self.bit(v >> 1 & 1 != 0);
                self.bit(false);
                self.bit(v & 1 != 0);
                self.bit(true);
            }
            _ => {
                let v = (high as u32 + 14) & 0xF;
                self.bit(v >> 3 != 0);
                self.bit(false);
                self.bit(v >> 2 & 1 != 0);
                self.bit(false);
                self.bit(v >> 1 & 1 != 0);
                self.bit(false);
                self.bit(v & 1 != 0);
            }
        }
    }

    fn long_count(&mut self, value: usize) {
        match value {
            1..=4 => {
                self.bits(0, value as u32 - 1);
                self.bit(true);
            }
            5..=6 => {
                self.bits(0b0000_1, 5);
                self.bit(value == 6);
            }
            7..=14 => {
                self.bits(0b0000_01, 6);
                self.bits(value as u32 - 7, 3);
            }
            15..=270 => {
                self.bits(0, 6);
                self.byte((value - 15) as u8);
            }
            _ => panic!("repeat value {value} out of range"),
        }
    }

    pub fn end(&mut self) {
        self.bit(false);
        self.bit(false);
        self.byte(0xFF);
        self.bit(false);
    }
}

/// Complete DIET file around an encoded stream
pub fn diet_file(payload_size: usize, stream: &[u8]) -> Vec<u8> {
    let mut blob = vec![0xB4, 0x4C, 0xCD, 0x21, 0x9D, 0x89, 0x64, 0x6C, 0x7A];
    blob.push(0x00);
    blob.extend_from_slice(&[0x12, 0x34, 0x56, 0x78]);
    blob.push((((payload_size >> 16) & 0x1F) << 2) as u8);
    blob.extend_from_slice(&((payload_size & 0xFFFF) as u16).to_le_bytes());
    blob.extend_from_slice(stream);
    blob
}

/// Greedy DIET encoder: longest earlier match within reach, else a literal
pub fn diet_encode(data: &[u8]) -> Vec<u8> {
    const MAX_DISTANCE: usize = 0x1_0000 - 0xE200;
    let mut w = DietWriter::default();
    let mut pos = 0;
    while pos < data.len() {
        let mut best = (0, 0);
        let start = pos.saturating_sub(MAX_DISTANCE);
        for src in start..pos {
            let mut len = 0;
            while pos + len < data.len() && len < 272 && data[src + len] == data[pos + len] {
                len += 1;
            }
            if len > best.1 {
                best = (pos - src, len);
            }
        }

        let (distance, len) = best;
        let short_ok = len == 2 && distance < 0x900 && distance != 1;
        if len >= 3 || short_ok {
            w.reference(distance, len);
            pos += len;
        } else {
            w.literal(data[pos]);
            pos += 1;
        }
    }
    w.end();
    w.out
}
