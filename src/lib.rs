//! SQZ - Rust decompressor for Titus packed game resources
//!
//! This crate unpacks the resource files of early-1990s Titus DOS games
//! (Prehistorik 2 and friends). Two containers are in use:
//!
//! - TTF-style SQZ files: a 4-byte header declaring the unpacked size and a
//!   format byte selecting either adaptive 9-12 bit LZW or a Huffman tree
//!   followed by run-length escapes.
//! - DIET data files: the `dlz` format written by the DIET 1.4x packer, a
//!   sliding-window scheme with prefix-coded offsets and lengths.
//!
//! Only decompression is provided. Every decode produces exactly the size
//! declared in the header or fails.
//!
//! # Example
//!
//! ```no_run
//! use sqz::{decompress, decompress_with, LzwMode, SqzError};
//!
//! let level = decompress("LEVEL1.SQZ")?;
//!
//! // One historical release swaps the LZW control codes
//! let menu = match decompress("MENU.SQZ") {
//!     Err(SqzError::LengthMismatch { .. }) => decompress_with("MENU.SQZ", LzwMode::Alternate)?,
//!     other => other?,
//! };
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

// Public modules
pub mod bits;
pub mod common;
pub mod diet;
pub mod error;
pub mod huffman;
pub mod lzw;
pub mod output;
pub mod rle;
pub mod unpack;

// Async modules (only available with async feature)
#[cfg(feature = "async")]
pub mod async_batch;

// Re-export commonly used types
pub use common::{
    ContainerFormat, ContainerHeader, DietHeader, LzwMode, PackedHeader, Result, SqzError,
    CONTAINER_HEADER_SIZE, DIET_HEADER_SIZE, DIET_MAGIC, DIET_SIGNATURE, FORMAT_LZW,
    LZW_DICT_LIMIT, LZW_FIRST_FREE, LZW_MAX_WIDTH, LZW_MIN_WIDTH,
};
pub use unpack::inspect;

#[cfg(feature = "async")]
pub use async_batch::{decompress_file_async, AsyncBatchProcessor};

// Convenience functions

/// Decompress a packed resource file
///
/// # Arguments
/// * `path` - Path of the SQZ or DIET file
///
/// # Returns
/// The unpacked payload, exactly as long as the header declares
pub fn decompress<P: AsRef<std::path::Path>>(path: P) -> Result<Vec<u8>> {
    unpack::decompress_with(path, LzwMode::Standard)
}

/// Decompress a packed resource file with an explicit LZW control-code
/// assignment
pub fn decompress_with<P: AsRef<std::path::Path>>(path: P, mode: LzwMode) -> Result<Vec<u8>> {
    unpack::decompress_with(path, mode)
}

/// Decompress a packed resource held in memory
///
/// # Arguments
/// * `data` - The whole file contents, header included
///
/// # Returns
/// The unpacked payload, exactly as long as the header declares
pub fn decompress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    unpack::decompress_bytes_with(data, LzwMode::Standard)
}

/// Decompress an in-memory resource with an explicit LZW control-code
/// assignment
pub fn decompress_bytes_with(data: &[u8], mode: LzwMode) -> Result<Vec<u8>> {
    unpack::decompress_bytes_with(data, mode)
}
