mod cli;

use anyhow::Context;
use clap::Parser;
use free_piano_midi::DecodeOptions;

use crate::cli::{CliArgs, Error};

fn main() {
    std::process::exit(match run() {
        Ok(()) => 0,
        Err(error) => {
            log::error!("{error}");
            1
        }
    });
}

/// Primary entry point of the program.
fn run() -> Result<(), Error> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("free_piano_midi=warn"),
    )
    .init();

    let args = CliArgs::parse();
    let file = args.file()?;
    let bytes = std::fs::read(file).context("failed to read file")?;

    let options = DecodeOptions {
        skip_percussion: args.skip_percussion,
        ..DecodeOptions::default()
    };
    let notes = free_piano_midi::decode_with(&bytes, &options)?;
    log::info!("decoded {} notes from {file:?}", notes.len());

    let json = if args.pretty {
        serde_json::to_string_pretty(&notes)
    } else {
        serde_json::to_string(&notes)
    }
    .context("failed to serialize notes")?;
    println!("{json}");
    Ok(())
}
