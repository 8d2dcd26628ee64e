extern crate anyhow;
extern crate bitvec;
extern crate clap;
extern crate serde;
extern crate serde_json;
extern crate thiserror;
extern crate voxell_timer;

use std::process::ExitCode;

#[macro_export]
macro_rules! if_tracing {
    {$($body:tt)*} => {
        ::cfg_if::cfg_if! {
            if #[cfg(feature = "tracing")] {
                $($body)*
            }
        }
    };
}

#[macro_export]
macro_rules! if_not_tracing {
    {$($body:tt)*} => {
        ::cfg_if::cfg_if! {
            if #[cfg(not(feature = "tracing"))] {
                $($body)*
            }
        }
    };
}

if_tracing! {
    use tracing_subscriber::{EnvFilter, fmt};
}

use crate::cli::{Cli, Command};
use clap::Parser;

mod cli;
mod compressor;
mod huffman;


fn main() -> ExitCode {
    if_tracing! {
        let subscriber = fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Compress(args) => cli::encode::encode(args),
        Command::Decompress(args) => cli::decode::decode(args),
        Command::Test(args) => cli::test::test(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if_tracing! {
                tracing::error!(error = %err, "command failed");
            }
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
