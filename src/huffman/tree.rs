use core::cmp::Reverse;
use std::collections::BinaryHeap;

use bitvec::prelude::*;

use crate::huffman::error::{HuffmanError, Result};
use crate::huffman::frequency::{Count, FrequencyTable};

if_tracing! {
    use tracing::debug;
}

/// Index of a node inside its tree's arena.
pub type NodeId = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Node {
    Leaf(u8),
    /// `children[0]` is reached with a 0 bit, `children[1]` with a 1 bit.
    Internal { children: [Option<NodeId>; 2] },
}

/// A binary prefix-code tree stored as an arena of nodes.
///
/// Built bottom-up from a [`FrequencyTable`] when compressing, or grown top-down from
/// `(symbol, code)` pairs when decompressing. Either way, the tree remembers its leaves
/// in priority order, which is the order the codebook is serialized in.
#[derive(Clone, Debug)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: NodeId,
    leaves: Vec<NodeId>,
}

impl HuffmanTree {
    /// Builds the huffman tree for `table` by repeatedly merging the two lightest nodes.
    ///
    /// Nodes of equal weight are ordered by creation: leaves are created in first-seen order
    /// before any internal node, so the same table always produces the same tree. The first
    /// node popped becomes the 0 branch, the second the 1 branch.
    ///
    /// A single-symbol table produces an internal root with the leaf on the 0 branch and
    /// nothing on the 1 branch, so the symbol still gets a one-bit code.
    pub fn build(table: &FrequencyTable) -> Result<Self> {
        if table.is_empty() {
            return Err(HuffmanError::EmptyAlphabet);
        }

        let mut nodes = Vec::with_capacity(table.len() * 2);
        let mut weights: Vec<Count> = Vec::with_capacity(table.len());
        let mut heap = BinaryHeap::with_capacity(table.len());
        for (symbol, count) in table.iter() {
            let id = nodes.len();
            nodes.push(Node::Leaf(symbol));
            weights.push(count);
            heap.push(Reverse((count, id)));
        }

        let mut leaves: Vec<NodeId> = (0..nodes.len()).collect();
        leaves.sort_by_key(|&id| (weights[id], id));

        if nodes.len() == 1 {
            nodes.push(Node::Internal { children: [Some(0), None] });
            return Ok(Self { nodes, root: 1, leaves });
        }

        let root = loop {
            let Some(Reverse((w0, left))) = heap.pop() else {
                return Err(HuffmanError::EmptyAlphabet);
            };
            let Some(Reverse((w1, right))) = heap.pop() else {
                break left;
            };
            let weight = w0
                .checked_add(w1)
                .ok_or_else(|| HuffmanError::InvalidFrequencies("total weight overflows".to_string()))?;

            let id = nodes.len();
            nodes.push(Node::Internal { children: [Some(left), Some(right)] });
            heap.push(Reverse((weight, id)));
        };

        if_tracing! {
            debug!(target: "huffman", leaves = leaves.len(), nodes = nodes.len(), "huffman tree built");
        }

        Ok(Self { nodes, root, leaves })
    }

    /// A tree holding nothing but an empty root, ready for [`insert`](Self::insert).
    pub fn empty() -> Self {
        Self {
            nodes: vec![Node::Internal { children: [None, None] }],
            root: 0,
            leaves: Vec::new(),
        }
    }

    /// Extends the tree along `code` and hangs `symbol` off the end of it.
    ///
    /// Fails if the code is empty or collides with a code inserted earlier.
    pub fn insert(&mut self, symbol: u8, code: &BitSlice<u8, Msb0>) -> Result<()> {
        if code.is_empty() {
            return Err(HuffmanError::MalformedHeader(format!("symbol {:#04x} has an empty code", symbol)));
        }
        let conflict = || {
            HuffmanError::MalformedHeader(format!(
                "code {} of symbol {:#04x} collides with another code",
                bit_string(code),
                symbol
            ))
        };

        let last = code.len() - 1;
        let mut current = self.root;
        for bit in code[..last].iter().by_vals() {
            let node = self.nodes[current];
            current = match node {
                Node::Internal { children } => match children[bit as usize] {
                    Some(next) => next,
                    None => self.attach(current, bit, Node::Internal { children: [None, None] }),
                },
                Node::Leaf(_) => return Err(conflict()),
            };
        }

        let node = self.nodes[current];
        match node {
            Node::Internal { children } if children[code[last] as usize].is_none() => {
                let leaf = self.attach(current, code[last], Node::Leaf(symbol));
                self.leaves.push(leaf);
                Ok(())
            }
            _ => Err(conflict()),
        }
    }

    fn attach(&mut self, parent: NodeId, bit: bool, node: Node) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        if let Node::Internal { children } = &mut self.nodes[parent] {
            children[bit as usize] = Some(id);
        }
        id
    }

    pub const fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Node {
        self.nodes[id]
    }

    /// The node reached from `id` by following `bit`, if there is one.
    pub fn child(&self, id: NodeId, bit: bool) -> Option<NodeId> {
        match self.nodes[id] {
            Node::Internal { children } => children[bit as usize],
            Node::Leaf(_) => None,
        }
    }

    /// Leaf ids in priority order.
    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }
}

pub(crate) fn bit_string(bits: &BitSlice<u8, Msb0>) -> String {
    bits.iter().by_vals().map(|bit| if bit { '1' } else { '0' }).collect()
}
