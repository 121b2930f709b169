//! Run-length expansion of Huffman symbols
//!
//! A symbol with an empty high byte is a literal. Otherwise its low byte
//! selects how the repeat count of the last literal is encoded:
//!
//! | low byte | count                                  |
//! |----------|----------------------------------------|
//! | `0`      | next symbol, truncated to 8 bits       |
//! | `1`      | next two symbols as high and low byte  |
//! | other    | the low byte itself                    |

use crate::huffman::HuffmanReader;
use crate::output::OutputBuffer;
use crate::Result;

/// Expand every symbol from `reader` into `output`
///
/// Running out of symbols, including while a count is expected, ends
/// decoding without error; the caller's length check catches truncation.
pub fn expand(reader: &mut HuffmanReader<'_>, output: &mut OutputBuffer) -> Result<()> {
    let mut last = 0u8;

    while let Some(symbol) = reader.read_symbol()? {
        let lo = (symbol & 0x00FF) as u8;
        let hi = symbol & 0xFF00;

        if hi == 0 {
            last = lo;
            output.push(last)?;
            continue;
        }

        let count = match lo {
            0 => match reader.read_symbol()? {
                // Byte count; the legacy tool repeats the full symbol value
                Some(n) => (n & 0xFF) as usize,
                None => break,
            },
            1 => {
                let Some(count_hi) = reader.read_symbol()? else {
                    break;
                };
                let Some(count_lo) = reader.read_symbol()? else {
                    break;
                };
                (((count_hi & 0xFF) as usize) << 8) | (count_lo & 0xFF) as usize
            }
            n => n as usize,
        };
        output.fill(last, count)?;
    }

    log::trace!("RLE expansion ended at {} bytes", output.position());
    Ok(())
}
