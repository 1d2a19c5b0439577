use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;

/// Prints the notes of a MIDI file as a JSON array of `{start, end, code}` objects.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the MIDI file.
    file: PathBuf,
    /// Pretty-print the JSON output.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
    /// Drop notes on the percussion channel.
    #[arg(long, default_value_t = false)]
    pub skip_percussion: bool,
}

impl CliArgs {
    /// Attempts to get the provided file path from the command line arguments.
    pub fn file(&self) -> Result<&PathBuf, Error> {
        if !self.file.exists() {
            return Err(Error::general(&format!(
                "{} not found",
                self.file.display()
            )));
        }

        Ok(&self.file)
    }
}

/// Custom error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A generically presented error.
    #[error("Error: {0:#}")]
    General(#[from] anyhow::Error),
    /// The file could not be decoded.
    #[error("Error: failed to decode midi file: {0}")]
    Decode(#[from] free_piano_midi::Error),
}

impl Error {
    /// Constructs a new instance of `Error::General` with the given message.
    pub fn general(message: &str) -> Self {
        Self::General(anyhow!("{}", message))
    }
}
