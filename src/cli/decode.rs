use anyhow::Result;

if_tracing! {
    use voxell_timer::time_fn;
}

use crate::cli::report::{SizeReport, read_input, write_output};
use crate::cli::{CliError, CodecArgs};
use crate::compressor::Compressor;
use crate::huffman::HuffmanCoding;

pub fn decode(args: CodecArgs) -> Result<()> {
    let input_path = &args.input;
    let output_path = &args.output;

    let compressed_data = read_input(input_path)?;
    let mut decompressed_data = Vec::new();
    let decoded;
    if_tracing! {{
        let (res, decomp_dur) = time_fn(|| HuffmanCoding.decompress_into(&compressed_data, &mut decompressed_data));
        match &res {
            Ok(()) => tracing::info!(event = "decode_complete", input = %input_path.display(), output = %output_path.display(), elapsed_us = %decomp_dur.as_micros(), decompressed_len = decompressed_data.len(), "decode finished"),
            Err(err) => tracing::error!(event = "decode_failed", input = %input_path.display(), output = %output_path.display(), elapsed_us = %decomp_dur.as_micros(), decoded_len = decompressed_data.len(), error = %err, "decode stopped early"),
        }
        decoded = res;
    }};
    if_not_tracing! {{
        decoded = HuffmanCoding.decompress_into(&compressed_data, &mut decompressed_data);
    }};

    if let Err(source) = decoded {
        write_output(output_path, &decompressed_data)?;
        return Err(CliError::IncompleteOutput {
            path: input_path.clone(),
            written: decompressed_data.len(),
            source,
        }
        .into());
    }

    write_output(output_path, &decompressed_data)?;

    let report = SizeReport {
        operation: "decompress",
        input: input_path,
        output: output_path,
        input_bytes: compressed_data.len(),
        output_bytes: decompressed_data.len(),
    };
    println!("{}", report.render(args.json)?);
    Ok(())
}
