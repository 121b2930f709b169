//! Format detection and dispatch
//!
//! A packed resource is either a DIET data file (recognised by its first two
//! bytes) or a TTF-style container whose format byte selects LZW or
//! Huffman+RLE. Every path decodes into a buffer of the declared size and
//! fails unless exactly that many bytes were produced.

use crate::bits::ByteCursor;
use crate::huffman::HuffmanReader;
use crate::output::OutputBuffer;
use crate::{
    diet, lzw, rle, ContainerFormat, ContainerHeader, DietHeader, LzwMode, PackedHeader, Result,
    SqzError, DIET_SIGNATURE,
};
use std::io::ErrorKind;
use std::path::Path;

/// Identify the input and parse its header without decoding
pub fn inspect(data: &[u8]) -> Result<PackedHeader> {
    if data.len() < 2 {
        return Err(SqzError::UnsupportedFormat(format!(
            "{} byte input has no signature",
            data.len()
        )));
    }

    if u16::from_le_bytes([data[0], data[1]]) == DIET_SIGNATURE {
        Ok(PackedHeader::Diet(DietHeader::parse(data)?))
    } else {
        Ok(PackedHeader::Container(ContainerHeader::parse(data)?))
    }
}

/// Decompress an in-memory resource
///
/// Input that runs out inside the compressed stream is reported as
/// [`SqzError::LengthMismatch`], the same as a stream that ends early.
/// Only a truncated header yields [`SqzError::UnexpectedEof`].
pub fn decompress_bytes_with(data: &[u8], mode: LzwMode) -> Result<Vec<u8>> {
    let header = inspect(data)?;
    let mut output = OutputBuffer::new(header.payload_size());
    let cursor = ByteCursor::new(&data[header.header_len()..]);

    decode_payload(&header, cursor, mode, &mut output).map_err(|e| match e {
        SqzError::UnexpectedEof(what) => {
            log::debug!("Input ended while reading {what}");
            SqzError::LengthMismatch {
                declared: header.payload_size(),
                produced: output.position(),
            }
        }
        other => other,
    })?;

    output.finish()
}

fn decode_payload(
    header: &PackedHeader,
    cursor: ByteCursor<'_>,
    mode: LzwMode,
    output: &mut OutputBuffer,
) -> Result<()> {
    match header {
        PackedHeader::Diet(_) => {
            log::debug!("DIET data, {} bytes declared", header.payload_size());
            diet::decode(cursor, output)
        }
        PackedHeader::Container(container) => {
            log::debug!(
                "{} container (format byte {:#04x}), {} bytes declared",
                container.format(),
                container.format_byte,
                container.payload_size
            );
            match container.format() {
                ContainerFormat::Lzw => lzw::decode(cursor, mode, output),
                ContainerFormat::HuffmanRle => {
                    let mut reader = HuffmanReader::new(cursor)?;
                    rle::expand(&mut reader, output)
                }
            }
        }
    }
}

/// Read and decompress a resource file
pub fn decompress_with<P: AsRef<Path>>(path: P, mode: LzwMode) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SqzError::NotFound(path.to_path_buf()),
        _ => SqzError::Io(e),
    })?;

    log::debug!("Unpacking '{}' ({} bytes)", path.display(), data.len());
    decompress_bytes_with(&data, mode)
}
