use bitvec::prelude::*;

use crate::huffman::codebook::Codebook;
use crate::huffman::error::{HuffmanError, Result};
use crate::huffman::tree::{HuffmanTree, Node};

if_tracing! {
    use tracing::debug;
}

/// Appends variable-length codes to a byte buffer, most significant bit first.
///
/// Complete bytes are flushed as soon as they fill up, so at most 7 bits are ever pending.
pub struct BitPacker<'a> {
    out: &'a mut Vec<u8>,
    pending: u8,
    filled: u8,
}

impl<'a> BitPacker<'a> {
    pub fn new(out: &'a mut Vec<u8>) -> Self {
        Self { out, pending: 0, filled: 0 }
    }

    pub fn push_bits(&mut self, bits: &BitSlice<u8, Msb0>) {
        for bit in bits.iter().by_vals() {
            self.pending = (self.pending << 1) | bit as u8;
            self.filled += 1;
            if self.filled == 8 {
                self.out.push(self.pending);
                self.pending = 0;
                self.filled = 0;
            }
        }
    }

    /// Zero-fills and flushes the pending bits, returning how many padding bits were added.
    pub fn finish(self) -> u8 {
        if self.filled == 0 {
            return 0;
        }
        let padding = 8 - self.filled;
        self.out.push(self.pending << padding);
        padding
    }
}

/// Packs the code of every byte of `data` onto the end of `out` and returns the padding count.
pub fn pack_into(data: &[u8], codebook: &Codebook, out: &mut Vec<u8>) -> Result<u8> {
    let codes = codebook.lookup_table();
    let mut packer = BitPacker::new(out);
    for &byte in data {
        let code = codes[byte as usize].ok_or(HuffmanError::MissingSymbol(byte))?;
        packer.push_bits(code.bits());
    }
    let padding = packer.finish();

    if_tracing! {
        debug!(target: "huffman", input_len = data.len(), output_len = out.len(), padding, "payload packed");
    }

    Ok(padding)
}

/// Walks `tree` along the payload bits, appending each decoded symbol to `out`.
///
/// The last `padding` bits of the payload are ignored; a padding of 8 drops the final byte
/// entirely. Symbols are pushed as soon as they are decoded, so on error `out` holds
/// everything decoded up to the corrupt bit.
pub fn unpack_into(payload: &[u8], padding: u8, tree: &HuffmanTree, out: &mut Vec<u8>) -> Result<()> {
    let bits = payload.view_bits::<Msb0>();
    if padding > 8 || padding as usize > bits.len() {
        return Err(HuffmanError::CorruptPayload(format!(
            "padding of {} bits doesn't fit a {}-byte payload",
            padding,
            payload.len()
        )));
    }
    let bits = &bits[..bits.len() - padding as usize];

    let root = tree.root();
    let mut current = root;
    for (index, bit) in bits.iter().by_vals().enumerate() {
        current = tree
            .child(current, bit)
            .ok_or_else(|| HuffmanError::CorruptPayload(format!("bit {} leads to a branch with no code", index)))?;
        if let Node::Leaf(symbol) = tree.node(current) {
            out.push(symbol);
            current = root;
        }
    }

    if current != root {
        return Err(HuffmanError::CorruptPayload("payload ends in the middle of a code".to_string()));
    }

    if_tracing! {
        debug!(target: "huffman", payload_len = payload.len(), padding, output_len = out.len(), "payload unpacked");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huffman::frequency::FrequencyTable;

    fn codec_for(data: &[u8]) -> (HuffmanTree, Codebook) {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(data)).unwrap();
        let codebook = Codebook::from_tree(&tree).unwrap();
        (tree, codebook)
    }

    #[test]
    fn packs_msb_first_with_trailing_padding() {
        let data = b"aaaabbbcca";
        let (_, codebook) = codec_for(data);

        let mut out = Vec::new();
        let padding = pack_into(data, &codebook, &mut out).unwrap();
        // 0000 111111 1010 0, then one zero bit of padding
        assert_eq!(out, [0b0000_1111, 0b1110_1000]);
        assert_eq!(padding, 1);
    }

    #[test]
    fn byte_aligned_payload_has_no_padding() {
        let data = b"abababab";
        let (tree, codebook) = codec_for(data);

        let mut out = Vec::new();
        let padding = pack_into(data, &codebook, &mut out).unwrap();
        assert_eq!(out, [0b0101_0101]);
        assert_eq!(padding, 0);

        let mut decoded = Vec::new();
        unpack_into(&out, padding, &tree, &mut decoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn padding_of_eight_drops_the_whole_final_byte() {
        let (tree, _) = codec_for(b"ab");
        let mut decoded = Vec::new();
        unpack_into(&[0b0101_0101, 0], 8, &tree, &mut decoded).unwrap();
        assert_eq!(decoded, b"abababab");
    }

    #[test]
    fn packing_appends_to_existing_bytes() {
        let (_, codebook) = codec_for(b"ab");
        let mut out = vec![0xAA];
        let padding = pack_into(b"ba", &codebook, &mut out).unwrap();
        assert_eq!(out, [0xAA, 0b1000_0000]);
        assert_eq!(padding, 6);
    }

    #[test]
    fn unknown_symbol_cannot_be_packed() {
        let (_, codebook) = codec_for(b"ab");
        let mut out = Vec::new();
        assert_eq!(pack_into(b"abc", &codebook, &mut out), Err(HuffmanError::MissingSymbol(b'c')));
    }

    #[test]
    fn impossible_padding_is_corrupt() {
        let (tree, _) = codec_for(b"ab");
        let mut decoded = Vec::new();
        assert!(matches!(unpack_into(&[0, 0], 9, &tree, &mut decoded), Err(HuffmanError::CorruptPayload(_))));
        assert!(matches!(unpack_into(&[], 1, &tree, &mut decoded), Err(HuffmanError::CorruptPayload(_))));
    }

    #[test]
    fn unused_branch_is_corrupt() {
        let (tree, _) = codec_for(&[0x41; 500]);
        let mut decoded = Vec::new();
        let err = unpack_into(&[0b0010_0000], 5, &tree, &mut decoded).unwrap_err();
        assert!(matches!(err, HuffmanError::CorruptPayload(_)));
        assert_eq!(decoded, [0x41, 0x41]);
    }

    #[test]
    fn partial_trailing_code_is_corrupt_but_keeps_the_decoded_prefix() {
        let (tree, _) = codec_for(b"aaaabbbcca");
        let mut decoded = Vec::new();
        // a, a, then half of b or c
        let err = unpack_into(&[0b0010_0000], 5, &tree, &mut decoded).unwrap_err();
        assert!(matches!(err, HuffmanError::CorruptPayload(_)));
        assert_eq!(decoded, b"aa");
    }
}
