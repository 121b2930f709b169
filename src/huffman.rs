//! Huffman tree and codeword reader
//!
//! The tree is stored in the stream as a flat table of 16-bit records.
//! Siblings occupy adjacent slots; a record with bit 15 set is a leaf holding
//! a 15-bit symbol, any other record is the byte offset of its child pair.

use crate::bits::{ByteCursor, MsbBitReader};
use crate::{Result, SqzError};

const LEAF_FLAG: u16 = 0x8000;

/// One slot of the tree table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// Emits the contained symbol
    Leaf(u16),
    /// Index of the first slot of the child pair
    Internal(usize),
}

impl Node {
    /// Decode a raw table record
    pub fn from_record(record: u16) -> Self {
        if record & LEAF_FLAG != 0 {
            Node::Leaf(record & !LEAF_FLAG)
        } else {
            Node::Internal((record >> 1) as usize)
        }
    }
}

/// Parsed Huffman tree, rooted at the pair in slots 0 and 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
}

impl HuffmanTree {
    /// Build a tree from raw table records
    pub fn from_records(records: &[u16]) -> Self {
        Self {
            nodes: records.iter().map(|&r| Node::from_record(r)).collect(),
        }
    }

    /// Read the table size (in bytes) and the records that follow it
    pub fn parse(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let node_count = (cursor.read_u16_le("Huffman table size")? >> 1) as usize;
        let mut records = Vec::with_capacity(node_count);
        for _ in 0..node_count {
            records.push(cursor.read_u16_le("Huffman table")?);
        }
        Ok(Self::from_records(&records))
    }

    /// Number of slots in the table
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the table has no slots
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Slot at `index`
    pub fn node(&self, index: usize) -> Result<Node> {
        self.nodes.get(index).copied().ok_or_else(|| {
            SqzError::CorruptStream(format!(
                "Huffman node index {index} outside table of {} entries",
                self.nodes.len()
            ))
        })
    }
}

/// Walks the tree over an MSB-first bit stream to produce symbols
#[derive(Debug)]
pub struct HuffmanReader<'a> {
    tree: HuffmanTree,
    bits: MsbBitReader<'a>,
}

impl<'a> HuffmanReader<'a> {
    /// Parse the tree; the bit stream starts right after the table
    pub fn new(mut cursor: ByteCursor<'a>) -> Result<Self> {
        let tree = HuffmanTree::parse(&mut cursor)?;
        Ok(Self::with_tree(tree, cursor))
    }

    /// Decode `cursor` with an already parsed tree
    pub fn with_tree(tree: HuffmanTree, cursor: ByteCursor<'a>) -> Self {
        Self {
            tree,
            bits: MsbBitReader::new(cursor),
        }
    }

    /// The tree in use
    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    /// Decode the next symbol
    ///
    /// Returns `Ok(None)` when the input runs out, including in the middle of
    /// a codeword; that is the normal end of a Huffman stream.
    pub fn read_symbol(&mut self) -> Result<Option<u16>> {
        let mut index = 0;
        while !self.bits.is_end_of_stream() {
            let Some(second) = self.bits.read_bit() else {
                break;
            };
            let slot = if second { index + 1 } else { index };
            match self.tree.node(slot)? {
                Node::Internal(child) => index = child,
                Node::Leaf(symbol) => return Ok(Some(symbol)),
            }
        }
        Ok(None)
    }
}
