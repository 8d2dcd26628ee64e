//! cli component of the huffpack project.
//!
//! lines starting with `> ` denote valid invocations. `$exename` stands for the executable
//! name, `huffpack` on linux or `huffpack.exe` on windows. `<description>` denotes a required
//! argument, `[description]` an optional one.
//!
//! # Compression
//!
//! > `$exename compress <input path> <output path> [--json]`
//!
//! reads the input file fully, builds a huffman code from its byte frequencies and writes a
//! container holding the codebook and the packed payload. the output file is only created once
//! encoding has succeeded; if writing it fails halfway the partial file is removed.
//! `enc` is accepted as a short alias.
//!
//! # Decompression
//!
//! > `$exename decompress <input path> <output path> [--json]`
//!
//! reads a container, rebuilds the tree from its codebook and replays the payload. if the
//! container turns out to be corrupt, every byte decoded up to that point is still written
//! to the output path and the command fails, saying how much of the output is there.
//! `dec` is accepted as a short alias.
//!
//! # Testing
//!
//! > `$exename test <input path>`
//!
//! compresses the file in memory, immediately decompresses the result and compares it with
//! the original, printing sizes and the compression ratio. nothing is written to disk.
//!
//! # Reports
//!
//! compress and decompress print the input and output sizes. with `--json` they print a single
//! json object instead, for scripts.
//!
//! logging goes to stderr and is filtered with `RUST_LOG` (e.g. `RUST_LOG=huffman=debug`).
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub mod decode;
pub mod encode;
pub mod report;

/// Error types for CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read input {}: {source}", path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("decompression of {} stopped early; only the first {written} bytes were written and the output is incomplete", path.display())]
    IncompleteOutput {
        path: PathBuf,
        written: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("roundtrip of {} did not reproduce the original ({original} bytes in, {decompressed} bytes out)", path.display())]
    RoundtripMismatch {
        path: PathBuf,
        original: usize,
        decompressed: usize,
    },
}

/// CLI arguments for the huffpack application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Supported commands for huffpack
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compress a file into a huffman container
    #[command(alias = "enc")]
    Compress(CodecArgs),

    /// Decompress a huffman container back into the original file
    #[command(alias = "dec")]
    Decompress(CodecArgs),

    /// Test compression/decompression roundtrip in memory
    Test(TestArgs),
}

/// Arguments shared by the compress and decompress commands
#[derive(Args, Debug)]
pub struct CodecArgs {
    /// Path to the input file
    pub input: PathBuf,

    /// Path for the output file
    pub output: PathBuf,

    /// Print the size report as json
    #[arg(long)]
    pub json: bool,
}

/// Arguments specific to the test command
#[derive(Args, Debug)]
pub struct TestArgs {
    /// Path to the file to roundtrip
    pub input: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn compress_takes_exactly_two_paths() {
        let cli = Cli::try_parse_from(["huffpack", "compress", "in.bin", "out.huff"]).unwrap();
        match cli.command {
            Command::Compress(args) => {
                assert_eq!(args.input, PathBuf::from("in.bin"));
                assert_eq!(args.output, PathBuf::from("out.huff"));
                assert!(!args.json);
            }
            other => panic!("parsed the wrong command: {:?}", other),
        }

        let err = Cli::try_parse_from(["huffpack", "compress", "in.bin"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        let err = Cli::try_parse_from(["huffpack", "compress", "a", "b", "c"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn aliases_and_flags_parse() {
        let cli = Cli::try_parse_from(["huffpack", "dec", "in.huff", "out.bin", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::Decompress(CodecArgs { json: true, .. })));

        let cli = Cli::try_parse_from(["huffpack", "enc", "a", "b"]).unwrap();
        assert!(matches!(cli.command, Command::Compress(_)));

        let cli = Cli::try_parse_from(["huffpack", "test", "a"]).unwrap();
        assert!(matches!(cli.command, Command::Test(TestArgs { .. })));
    }

    #[test]
    fn usage_errors_exit_with_status_two() {
        let err = Cli::try_parse_from(["huffpack", "decompress"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
