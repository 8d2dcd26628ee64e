use anyhow::Result;
use voxell_timer::time_fn;

use crate::cli::CodecArgs;
use crate::cli::report::{SizeReport, read_input, write_output};
use crate::compressor::Compressor;
use crate::huffman::HuffmanCoding;

pub fn encode(args: CodecArgs) -> Result<()> {
    let input_path = &args.input;
    let output_path = &args.output;

    let input_data = read_input(input_path)?;
    let (compressed, _comp_dur) = time_fn(|| HuffmanCoding.compress_bytes(&input_data));
    let compressed_data = compressed?;
    if_tracing! {
        tracing::info!(event = "encode_complete", input = %input_path.display(), output = %output_path.display(), elapsed_us = %_comp_dur.as_micros(), compressed_len = compressed_data.len(), "encode finished");
    }
    write_output(output_path, &compressed_data)?;

    let report = SizeReport {
        operation: "compress",
        input: input_path,
        output: output_path,
        input_bytes: input_data.len(),
        output_bytes: compressed_data.len(),
    };
    println!("{}", report.render(args.json)?);
    Ok(())
}
