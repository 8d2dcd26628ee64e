use thiserror::Error;

/// Errors produced while building, writing or reading a huffman container.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HuffmanError {
    /// The header declares something the bytes can't back up, or a codeword field is invalid.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// The container ended before the mandatory padding trailer.
    #[error("truncated payload: container ends before the padding trailer")]
    TruncatedPayload,

    #[error("code for symbol {symbol:#04x} needs {length} bits, but a codeword field holds at most 127")]
    CodeLengthOverflow { symbol: u8, length: usize },

    /// The payload bits don't decode cleanly with the rebuilt tree.
    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    #[error("symbol {0:#04x} has no code in the codebook")]
    MissingSymbol(u8),

    #[error("invalid frequency table: {0}")]
    InvalidFrequencies(String),

    #[error("cannot build a huffman tree from an empty frequency table")]
    EmptyAlphabet,
}

pub type Result<T, E = HuffmanError> = core::result::Result<T, E>;
