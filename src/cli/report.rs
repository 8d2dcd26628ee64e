use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::CliError;

/// Sizes reported after a compress or decompress run.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SizeReport<'a> {
    pub operation: &'static str,
    pub input: &'a Path,
    pub output: &'a Path,
    pub input_bytes: usize,
    pub output_bytes: usize,
}

impl SizeReport<'_> {
    /// Renders the report as human readable lines, or as a single json object.
    pub fn render(&self, json: bool) -> Result<String> {
        if json {
            return Ok(serde_json::to_string(self)?);
        }

        let (done, input_label, output_label) = match self.operation {
            "compress" => ("Compressed successfully", "Input File Size     ", "Compressed File Size"),
            _ => ("Decompressed successfully", "Compressed File Size", "Output File Size    "),
        };
        Ok(format!(
            "{}\n{}: {} bytes\n{}: {} bytes",
            done, input_label, self.input_bytes, output_label, self.output_bytes
        ))
    }
}

/// Reads the whole input file, mapping failures to [`CliError::InputNotFound`].
pub fn read_input(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|source| CliError::InputNotFound {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `data` to `path`. If the write fails partway, the partial file is removed.
pub fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    let written = File::create(path).and_then(|mut file| {
        file.write_all(data)?;
        file.sync_all()
    });

    if let Err(err) = written {
        if_tracing! {
            tracing::error!(output = %path.display(), error = %err, "write failed, removing partial output");
        }
        remove_partial(path);
        return Err(err).with_context(|| format!("failed to write {}", path.display()));
    }
    Ok(())
}

fn remove_partial(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(_err) => {
            if_tracing! {
                tracing::warn!(output = %path.display(), error = %_err, "could not remove partial output");
            }
        }
    }
}
