use core::fmt;
use std::io::{Cursor, Read};

use bitvec::prelude::*;

use crate::huffman::error::{HuffmanError, Result};
use crate::huffman::tree::{HuffmanTree, Node, bit_string};

if_tracing! {
    use tracing::{debug, warn};
}

/// Width of a serialized codeword field.
pub const FIELD_BITS: usize = 128;
/// Longest code that fits in a codeword field next to its sentinel bit.
pub const MAX_CODE_LEN: usize = FIELD_BITS - 1;
/// Serialized size of one codebook entry: a u16 symbol id followed by the codeword field.
pub const ENTRY_LEN: usize = 2 + FIELD_BITS / 8;
/// Largest number of entries a codebook over bytes can have.
pub const MAX_SYMBOLS: usize = 256;

/// The bit path from the root of a huffman tree to one of its leaves.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Code(BitVec<u8, Msb0>);

impl Code {
    pub fn bits(&self) -> &BitSlice<u8, Msb0> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<&BitSlice<u8, Msb0>> for Code {
    fn from(bits: &BitSlice<u8, Msb0>) -> Self {
        Self(bits.to_bitvec())
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bit_string(&self.0))
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code({})", self)
    }
}

/// Symbol to code mapping, in serialization order.
///
/// For a freshly built tree this is ascending-frequency order, the order leaves entered the
/// priority queue. For a codebook read back from a container it is the order the entries
/// were stored in, so both sides of a round trip agree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Codebook {
    entries: Vec<(u8, Code)>,
}

impl Codebook {
    /// Derives every leaf's code from `tree`.
    ///
    /// The walk keeps an explicit stack of `(node, path)` pairs, so skewed trees
    /// (up to 255 levels deep) don't recurse. Fails with
    /// [`CodeLengthOverflow`](HuffmanError::CodeLengthOverflow) if any code is longer than
    /// [`MAX_CODE_LEN`].
    pub fn from_tree(tree: &HuffmanTree) -> Result<Self> {
        let mut codes: [Option<Code>; MAX_SYMBOLS] = core::array::from_fn(|_| None);
        let mut stack = vec![(tree.root(), BitVec::<u8, Msb0>::new())];

        while let Some((id, path)) = stack.pop() {
            match tree.node(id) {
                Node::Leaf(symbol) => {
                    if path.len() > MAX_CODE_LEN {
                        if_tracing! {
                            warn!(target: "huffman", symbol, length = path.len(), "code too long for a codeword field");
                        }
                        return Err(HuffmanError::CodeLengthOverflow { symbol, length: path.len() });
                    }
                    codes[symbol as usize] = Some(Code(path));
                }
                Node::Internal { children } => {
                    // push the 1 branch first so the 0 branch is walked first
                    for bit in [true, false] {
                        if let Some(child) = children[bit as usize] {
                            let mut next = path.clone();
                            next.push(bit);
                            stack.push((child, next));
                        }
                    }
                }
            }
        }

        let mut entries = Vec::with_capacity(tree.leaves().len());
        for &leaf in tree.leaves() {
            if let Node::Leaf(symbol) = tree.node(leaf) {
                let code = codes[symbol as usize].take().ok_or(HuffmanError::MissingSymbol(symbol))?;
                entries.push((symbol, code));
            }
        }

        if_tracing! {
            debug!(
                target: "huffman",
                symbols = entries.len(),
                max_code_len = entries.iter().map(|(_, code)| code.len()).max().unwrap_or(0),
                "codebook generated"
            );
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, symbol: u8) -> Option<&Code> {
        self.entries.iter().find(|(s, _)| *s == symbol).map(|(_, code)| code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.entries.iter().map(|(symbol, code)| (*symbol, code))
    }

    /// Codes indexed by symbol value.
    pub fn lookup_table(&self) -> [Option<&Code>; MAX_SYMBOLS] {
        let mut table = [None; MAX_SYMBOLS];
        for (symbol, code) in self.iter() {
            table[symbol as usize] = Some(code);
        }
        table
    }

    /// Appends the header: a big-endian i32 symbol count, then one entry per symbol.
    pub fn write_to(&self, out: &mut Vec<u8>) -> Result<()> {
        out.reserve(4 + self.entries.len() * ENTRY_LEN);
        out.extend_from_slice(&(self.entries.len() as i32).to_be_bytes());
        for (symbol, code) in &self.entries {
            out.extend_from_slice(&u16::from(*symbol).to_be_bytes());
            out.extend_from_slice(&encode_field(*symbol, code)?);
        }
        Ok(())
    }

    /// Reads a header written by [`write_to`](Self::write_to), rebuilding the decode tree
    /// entry by entry as it goes.
    pub fn read_from(cursor: &mut Cursor<&[u8]>) -> Result<(Self, HuffmanTree)> {
        let mut count = [0u8; 4];
        cursor
            .read_exact(&mut count)
            .map_err(|_| HuffmanError::MalformedHeader("container is shorter than its 4-byte symbol count".to_string()))?;
        let count = i32::from_be_bytes(count);
        let count = usize::try_from(count)
            .ok()
            .filter(|&count| count <= MAX_SYMBOLS)
            .ok_or_else(|| HuffmanError::MalformedHeader(format!("symbol count {} is outside 0..={}", count, MAX_SYMBOLS)))?;

        let available = cursor.get_ref().len().saturating_sub(cursor.position() as usize);
        if available < count * ENTRY_LEN {
            return Err(HuffmanError::MalformedHeader(format!(
                "header declares {} symbols ({} bytes) but only {} bytes follow",
                count,
                count * ENTRY_LEN,
                available
            )));
        }

        let mut seen = [false; MAX_SYMBOLS];
        let mut entries = Vec::with_capacity(count);
        let mut tree = HuffmanTree::empty();
        for _ in 0..count {
            let mut id = [0u8; 2];
            let mut field = [0u8; FIELD_BITS / 8];
            cursor
                .read_exact(&mut id)
                .and_then(|()| cursor.read_exact(&mut field))
                .map_err(|_| HuffmanError::MalformedHeader("codebook entry cut short".to_string()))?;

            let id = u16::from_be_bytes(id);
            let symbol = u8::try_from(id).map_err(|_| HuffmanError::MalformedHeader(format!("symbol id {} is not a byte value", id)))?;
            if seen[symbol as usize] {
                return Err(HuffmanError::MalformedHeader(format!("symbol {:#04x} appears twice", symbol)));
            }
            seen[symbol as usize] = true;

            let code = decode_field(symbol, &field)?;
            tree.insert(symbol, code.bits())?;
            entries.push((symbol, code));
        }

        if_tracing! {
            debug!(target: "huffman", symbols = count, "codebook read");
        }

        Ok((Self { entries }, tree))
    }
}

/// Lays `code` out in a codeword field: `127 - len` zero bits, a 1 sentinel, then the code.
pub fn encode_field(symbol: u8, code: &Code) -> Result<[u8; FIELD_BITS / 8]> {
    if code.len() > MAX_CODE_LEN {
        return Err(HuffmanError::CodeLengthOverflow { symbol, length: code.len() });
    }

    let mut field = BitArray::<_, Msb0>::new([0u8; FIELD_BITS / 8]);
    let start = FIELD_BITS - code.len();
    field.set(start - 1, true);
    field[start..].copy_from_bitslice(code.bits());
    Ok(field.into_inner())
}

/// Recovers the code stored in a codeword field: everything after the first 1 bit.
pub fn decode_field(symbol: u8, field: &[u8; FIELD_BITS / 8]) -> Result<Code> {
    let bits = field.as_slice().view_bits::<Msb0>();
    let Some(sentinel) = bits.first_one() else {
        return Err(HuffmanError::MalformedHeader(format!("codeword field of symbol {:#04x} has no sentinel bit", symbol)));
    };

    let code = &bits[sentinel + 1..];
    if code.is_empty() {
        return Err(HuffmanError::MalformedHeader(format!("codeword field of symbol {:#04x} holds an empty code", symbol)));
    }
    Ok(Code::from(code))
}
