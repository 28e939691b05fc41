//! Command-line front end for the JSON reader.
//!
//! Parses a file (or standard input) and prints the value or the
//! diagnostic; the exit code reports validity.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use strict_json::parse_bytes;

#[derive(Parser)]
#[command(name = "strict-json")]
#[command(about = "Strict JSON reader with positioned diagnostics", long_about = None)]
#[command(version)]
struct Cli {
    /// File to parse; standard input when omitted.
    file: Option<PathBuf>,

    /// Report validity only, without printing the value.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let input = match read_input(cli.file.as_deref()) {
        Ok(bytes) => bytes,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    };

    match parse_bytes(&input) {
        Ok(value) => {
            if !cli.quiet {
                println!("{value}");
            }
            ExitCode::SUCCESS
        }
        Err(diagnostic) => {
            eprintln!("error: {diagnostic}");
            ExitCode::FAILURE
        }
    }
}

fn read_input(file: Option<&Path>) -> std::io::Result<Vec<u8>> {
    match file {
        Some(path) => fs::read(path),
        None => {
            let mut buffer = Vec::new();
            std::io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}
