if_tracing! {
    use tracing::debug;
}

/// Occurrence count of a symbol.
pub type Count = u128;

/// Occurrence counts of every distinct byte value in an input, in first-seen order.
///
/// Only symbols that actually occur are present, so every stored count is at least 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [Count; 256],
    order: Vec<u8>,
}

impl FrequencyTable {
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = [0; 256];
        let mut order = Vec::new();
        for &byte in data {
            let slot = &mut counts[byte as usize];
            if *slot == 0 {
                order.push(byte);
            }
            *slot += 1;
        }

        if_tracing! {
            debug!(target: "huffman", input_len = data.len(), distinct = order.len(), "frequency table built");
        }

        Self { counts, order }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Count of `symbol`, 0 if it never occurred.
    pub fn count(&self, symbol: u8) -> Count {
        self.counts[symbol as usize]
    }

    pub fn total(&self) -> Count {
        self.iter().map(|(_, count)| count).sum()
    }

    /// `(symbol, count)` pairs in the order the symbols were first seen.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Count)> + '_ {
        self.order.iter().map(|&symbol| (symbol, self.count(symbol)))
    }
}

#[cfg(test)]
use crate::huffman::error::{HuffmanError, Result};

#[cfg(test)]
impl FrequencyTable {
    /// Builds a table from explicit `(symbol, count)` pairs. Pair order becomes first-seen order.
    pub fn from_counts(pairs: impl IntoIterator<Item = (u8, Count)>) -> Result<Self> {
        let mut counts = [0; 256];
        let mut order = Vec::new();
        for (symbol, count) in pairs {
            if count == 0 {
                return Err(HuffmanError::InvalidFrequencies(format!("symbol {:#04x} was given a zero count", symbol)));
            }
            if counts[symbol as usize] != 0 {
                return Err(HuffmanError::InvalidFrequencies(format!("symbol {:#04x} was counted twice", symbol)));
            }
            counts[symbol as usize] = count;
            order.push(symbol);
        }
        Ok(Self { counts, order })
    }
}

/// 130 symbols with Fibonacci weights form a chain 129 levels deep; the heavy tail keeps
/// the table at 256 symbols without shortening it.
#[cfg(test)]
pub(crate) fn skewed_table() -> FrequencyTable {
    let mut pairs = Vec::with_capacity(256);
    let (mut a, mut b): (Count, Count) = (1, 1);
    for symbol in 0..130u8 {
        pairs.push((symbol, a));
        (a, b) = (b, a + b);
    }
    pairs.extend((130..=255u8).map(|symbol| (symbol, 1 << 100)));
    FrequencyTable::from_counts(pairs).unwrap()
}
