//! The on-disk layout of a compressed file.
//!
//! | field           | size           | contents                                          |
//! |-----------------|----------------|---------------------------------------------------|
//! | symbol count    | 4 bytes, i32   | number of distinct symbols `N`, big-endian        |
//! | codebook        | `N` × 18 bytes | u16 symbol id + 128-bit codeword field, per entry |
//! | payload         | variable       | packed codes, most significant bit first          |
//! | padding count   | 1 byte         | zero bits appended to the last payload byte (0-8) |
//!
//! An empty input is stored as a zero symbol count, no payload and a padding count of 0.

use std::io::Cursor;

use crate::huffman::bits::{pack_into, unpack_into};
use crate::huffman::codebook::{Codebook, ENTRY_LEN};
use crate::huffman::error::{HuffmanError, Result};
use crate::huffman::frequency::FrequencyTable;
use crate::huffman::tree::HuffmanTree;

if_tracing! {
    use tracing::{debug, info, warn};
}

/// Compresses `data` into a self-contained container.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    compress_with_table(&FrequencyTable::from_bytes(data), data)
}

/// Compresses `data` using the code derived from `table` instead of from `data` itself.
///
/// Every byte of `data` must occur in `table`.
pub fn compress_with_table(table: &FrequencyTable, data: &[u8]) -> Result<Vec<u8>> {
    if_tracing! {
        debug!(target: "huffman", input_len = data.len(), symbols = table.len(), weight = %table.total(), "compress start");
    }

    let codebook = if table.is_empty() {
        Codebook::default()
    } else {
        Codebook::from_tree(&HuffmanTree::build(table)?)?
    };

    let mut out = Vec::with_capacity(4 + codebook.len() * ENTRY_LEN + data.len() / 2 + 1);
    codebook.write_to(&mut out)?;
    let padding = pack_into(data, &codebook, &mut out)?;
    out.push(padding);

    if_tracing! {
        info!(target: "huffman", input_len = data.len(), output_len = out.len(), symbols = codebook.len(), padding, "compress complete");
    }

    Ok(out)
}

/// Decompresses a container, appending the recovered bytes to `buf`.
///
/// On error, `buf` keeps every byte decoded before the failure.
pub fn decompress_into(data: &[u8], buf: &mut Vec<u8>) -> Result<()> {
    if_tracing! {
        debug!(target: "huffman", input_len = data.len(), "decompress start");
    }

    let mut cursor = Cursor::new(data);
    let (codebook, tree) = Codebook::read_from(&mut cursor)?;
    let body = &data[cursor.position() as usize..];
    let Some((&padding, payload)) = body.split_last() else {
        if_tracing! {
            warn!(target: "huffman", input_len = data.len(), "container has no padding trailer");
        }
        return Err(HuffmanError::TruncatedPayload);
    };

    let start = buf.len();
    unpack_into(payload, padding, &tree, buf)?;

    if_tracing! {
        info!(target: "huffman", input_len = data.len(), output_len = buf.len() - start, symbols = codebook.len(), padding, "decompress complete");
    }

    Ok(())
}

pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    decompress_into(data, &mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huffman::codebook::{Code, encode_field};
    use crate::huffman::frequency::skewed_table;
    use bitvec::prelude::*;

    #[test]
    fn concrete_scenario_round_trips_and_shrinks_the_payload() {
        let data = b"aaaabbbcca";
        let container = compress(data).unwrap();

        let header_len = 4 + 3 * ENTRY_LEN;
        let payload_len = container.len() - header_len - 1;
        assert_eq!(payload_len, 2);
        assert!(payload_len * 8 < data.len() * 8);
        assert_eq!(container[..4], 3i32.to_be_bytes());
        assert_eq!(*container.last().unwrap(), 1);

        assert_eq!(decompress(&container).unwrap(), data);
    }

    #[test]
    fn empty_input_is_a_bare_header_and_trailer() {
        let container = compress(&[]).unwrap();
        assert_eq!(container, [0, 0, 0, 0, 0]);
        assert_eq!(decompress(&container).unwrap(), b"");
    }

    #[test]
    fn empty_payload_padded_to_a_full_byte_is_accepted() {
        assert_eq!(decompress(&[0, 0, 0, 0, 0, 8]).unwrap(), b"");
    }

    #[test]
    fn single_symbol_input_round_trips() {
        let data = [0x41; 500];
        let container = compress(&data).unwrap();
        // 500 one-bit codes: 62 full bytes and 4 bits
        assert_eq!(container.len(), 4 + ENTRY_LEN + 63 + 1);
        assert_eq!(*container.last().unwrap(), 4);
        assert_eq!(decompress(&container).unwrap(), data);
    }

    #[test]
    fn byte_aligned_payload_records_zero_padding() {
        let data = b"abababab";
        let container = compress(data).unwrap();
        assert_eq!(*container.last().unwrap(), 0);
        assert_eq!(decompress(&container).unwrap(), data);
    }

    #[test]
    fn compression_is_deterministic() {
        let data: Vec<u8> = b"equal counts everywhere: abcdefgh hgfedcba".repeat(17);
        assert_eq!(compress(&data).unwrap(), compress(&data).unwrap());
    }

    #[test]
    fn missing_trailer_is_truncation() {
        let container = compress(&[]).unwrap();
        assert_eq!(decompress(&container[..4]), Err(HuffmanError::TruncatedPayload));

        let mut header = 1i32.to_be_bytes().to_vec();
        header.extend_from_slice(&[0, b'z']);
        header.extend_from_slice(&encode_field(b'z', &Code::from(bits![u8, Msb0; 0])).unwrap());
        assert_eq!(decompress(&header), Err(HuffmanError::TruncatedPayload));
    }

    #[test]
    fn short_header_is_malformed() {
        let container = compress(b"hello world").unwrap();
        assert!(matches!(decompress(&container[..3]), Err(HuffmanError::MalformedHeader(_))));
        assert!(matches!(decompress(&container[..4 + ENTRY_LEN]), Err(HuffmanError::MalformedHeader(_))));
    }

    #[test]
    fn empty_codebook_with_payload_is_corrupt() {
        assert!(matches!(decompress(&[0, 0, 0, 0, 0xFF, 0]), Err(HuffmanError::CorruptPayload(_))));
    }

    #[test]
    fn corruption_keeps_the_decoded_prefix() {
        let data = b"aaaabbbcca";
        let mut container = compress(data).unwrap();
        // drop the last payload byte, keep the trailer
        let trailer = container.pop().unwrap();
        container.pop();
        container.push(trailer);

        let mut buf = Vec::new();
        // seven bits survive the padding: 0000 11 1, four a's, a b and half a code
        let err = decompress_into(&container, &mut buf).unwrap_err();
        assert!(matches!(err, HuffmanError::CorruptPayload(_)));
        assert_eq!(buf, b"aaaab");
    }

    #[test]
    fn skewed_table_fails_instead_of_emitting_a_container() {
        let table = skewed_table();

        let data: Vec<u8> = (0..=255).collect();
        assert!(matches!(
            compress_with_table(&table, &data),
            Err(HuffmanError::CodeLengthOverflow { length, .. }) if length >= 128
        ));
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn codec_events_use_the_huffman_target() {
        use std::sync::{Arc, Mutex};
        use tracing::span::{Attributes, Id, Record};
        use tracing::{Event, Metadata, Subscriber};

        struct Targets(Arc<Mutex<Vec<String>>>);

        impl Subscriber for Targets {
            fn enabled(&self, _: &Metadata<'_>) -> bool {
                true
            }
            fn new_span(&self, _: &Attributes<'_>) -> Id {
                Id::from_u64(1)
            }
            fn record(&self, _: &Id, _: &Record<'_>) {}
            fn record_follows_from(&self, _: &Id, _: &Id) {}
            fn event(&self, event: &Event<'_>) {
                self.0.lock().unwrap().push(event.metadata().target().to_owned());
            }
            fn enter(&self, _: &Id) {}
            fn exit(&self, _: &Id) {}
        }

        let seen = Arc::new(Mutex::new(Vec::new()));
        tracing::subscriber::with_default(Targets(Arc::clone(&seen)), || {
            let container = compress(b"aaaabbbcca").unwrap();
            decompress(&container).unwrap();
        });

        let seen = seen.lock().unwrap();
        assert!(seen.len() >= 6, "too few events: {:?}", seen);
        assert!(seen.iter().all(|target| target == "huffman"), "{:?}", seen);
    }
}
