use std::fmt::Display;

use anyhow::anyhow;

use crate::compressor::{Compressor, Result};

pub mod bits;
pub mod codebook;
pub mod container;
pub mod error;
pub mod frequency;
pub mod tree;

/// Static huffman coding over bytes, with the codebook stored in front of the payload.
#[derive(Clone, Copy, Debug, Default)]
pub struct HuffmanCoding;

impl Compressor for HuffmanCoding {
    fn compress_bytes(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        container::compress(data).map_err(|e| anyhow!(e).context("huffman encoding failed"))
    }

    fn decompress_into(&mut self, data: &[u8], buf: &mut Vec<u8>) -> Result<()> {
        container::decompress_into(data, buf).map_err(|e| anyhow!(e).context("huffman decoding failed"))
    }

    fn decompress_bytes(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        container::decompress(data).map_err(|e| anyhow!(e).context("huffman decoding failed"))
    }

    fn compressor_name(&self) -> &'static str {
        "huffman"
    }
}

impl Display for HuffmanCoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Huffman Coding")
    }
}
