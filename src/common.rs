//! Common types and constants for the SQZ/DIET decompression engine
//!
//! This module defines the error type, the two header layouts and the
//! constants shared by the LZW, Huffman+RLE and DIET decoders.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Little-endian value of the first two bytes of every DIET data file
pub const DIET_SIGNATURE: u16 = 0x4CB4;

/// Full DIET magic (`\xB4\x4C\xCD\x21\x9D\x89` followed by `dlz`)
pub const DIET_MAGIC: [u8; 9] = [0xB4, 0x4C, 0xCD, 0x21, 0x9D, 0x89, 0x64, 0x6C, 0x7A];

/// Size of the DIET header: magic, one unknown byte, checksum, packed size
pub const DIET_HEADER_SIZE: usize = 17;

/// Size of the TTF-style container header
pub const CONTAINER_HEADER_SIZE: usize = 4;

/// Container format byte selecting the LZW decoder
pub const FORMAT_LZW: u8 = 0x10;

/// Largest LZW code width in bits
pub const LZW_MAX_WIDTH: u32 = 12;

/// Initial LZW code width in bits
pub const LZW_MIN_WIDTH: u32 = 9;

/// LZW dictionary capacity (codes 0..4095)
pub const LZW_DICT_LIMIT: usize = 0x1000;

/// First free LZW code after the 256 literals and the two control codes
pub const LZW_FIRST_FREE: usize = 0x102;

/// Error type for decompression operations
#[derive(Debug, Error)]
pub enum SqzError {
    /// Input file does not exist
    #[error("No such input file: {}", .0.display())]
    NotFound(PathBuf),

    /// DIET signature matched but the full magic did not
    #[error("Not a DIET file: bad magic")]
    BadMagic,

    /// Input cannot be identified as any known container
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Structural violation inside a compressed stream
    #[error("Corrupt stream: {0}")]
    CorruptStream(String),

    /// Decoded size differs from the size declared in the header
    #[error("Invalid decoded data length: header declares {declared} bytes, decoder produced {produced} (maybe try alternate LZW?)")]
    LengthMismatch {
        /// Payload size from the header
        declared: usize,
        /// Bytes produced (or that a write would have reached)
        produced: usize,
    },

    /// Input ended inside a header
    ///
    /// Decoders raise it too when their input runs out; the dispatcher
    /// reports that case as [`SqzError::LengthMismatch`].
    #[error("Unexpected end of input while reading {0}")]
    UnexpectedEof(&'static str),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for decompression operations
pub type Result<T> = std::result::Result<T, SqzError>;

/// Assignment of the two LZW control codes
///
/// The alternate assignment swaps clear and end. It is used by the SQZ
/// executable shipped with CDRUN.COM on the "10 Great Games" CD-ROM and has
/// to be requested explicitly; nothing in the data identifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LzwMode {
    /// `clear = 0x100`, `end = 0x101`
    #[default]
    Standard,
    /// `clear = 0x101`, `end = 0x100`
    Alternate,
}

impl LzwMode {
    /// Code that resets the dictionary
    pub fn clear_code(&self) -> u16 {
        match self {
            LzwMode::Standard => 0x100,
            LzwMode::Alternate => 0x101,
        }
    }

    /// Code that terminates the stream
    pub fn end_code(&self) -> u16 {
        match self {
            LzwMode::Standard => 0x101,
            LzwMode::Alternate => 0x100,
        }
    }
}

/// Decoder selected by the container format byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// Adaptive 9-12 bit LZW
    Lzw,
    /// Huffman tree followed by run-length escapes
    HuffmanRle,
}

impl ContainerFormat {
    /// Map a raw format byte to a decoder. Only `0x10` means LZW.
    pub fn from_u8(value: u8) -> Self {
        if value == FORMAT_LZW {
            ContainerFormat::Lzw
        } else {
            ContainerFormat::HuffmanRle
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerFormat::Lzw => write!(f, "LZW"),
            ContainerFormat::HuffmanRle => write!(f, "Huffman+RLE"),
        }
    }
}

/// TTF-style 4-byte container header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Raw format byte
    pub format_byte: u8,
    /// Decompressed payload size
    pub payload_size: usize,
}

impl ContainerHeader {
    /// Parse the header from the first four bytes of `data`
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < CONTAINER_HEADER_SIZE {
            return Err(SqzError::UnexpectedEof("container header"));
        }

        // Bits 4..7 of the first byte are unused
        let size_hi = (data[0] & 0x0F) as usize;
        let size_lo = u16::from_le_bytes([data[2], data[3]]) as usize;

        Ok(Self {
            format_byte: data[1],
            payload_size: (size_hi << 16) | size_lo,
        })
    }

    /// Decoder selected by the format byte
    pub fn format(&self) -> ContainerFormat {
        ContainerFormat::from_u8(self.format_byte)
    }
}

/// DIET data file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DietHeader {
    /// Byte following the magic, meaning unknown
    pub unknown: u8,
    /// Checksum field, not validated
    pub checksum: [u8; 4],
    /// Decompressed payload size
    pub payload_size: usize,
}

impl DietHeader {
    /// Verify the magic and parse the header from the start of `data`
    pub fn parse(data: &[u8]) -> Result<Self> {
        let magic_len = data.len().min(DIET_MAGIC.len());
        if magic_len < DIET_MAGIC.len() || data[..magic_len] != DIET_MAGIC {
            return Err(SqzError::BadMagic);
        }
        if data.len() < DIET_HEADER_SIZE {
            return Err(SqzError::UnexpectedEof("DIET header"));
        }

        let size_hi = ((data[14] >> 2) & 0x1F) as usize;
        let size_lo = u16::from_le_bytes([data[15], data[16]]) as usize;

        Ok(Self {
            unknown: data[9],
            checksum: [data[10], data[11], data[12], data[13]],
            payload_size: (size_hi << 16) | size_lo,
        })
    }
}

/// Header of a packed resource, as identified by its leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackedHeader {
    /// DIET-compressed data file
    Diet(DietHeader),
    /// TTF-style container holding LZW or Huffman+RLE data
    Container(ContainerHeader),
}

impl PackedHeader {
    /// Decompressed payload size declared by the header
    pub fn payload_size(&self) -> usize {
        match self {
            PackedHeader::Diet(h) => h.payload_size,
            PackedHeader::Container(h) => h.payload_size,
        }
    }

    /// Number of header bytes preceding the compressed stream
    pub fn header_len(&self) -> usize {
        match self {
            PackedHeader::Diet(_) => DIET_HEADER_SIZE,
            PackedHeader::Container(_) => CONTAINER_HEADER_SIZE,
        }
    }
}
