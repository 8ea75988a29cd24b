//! Record and replay HTTP interactions through a cassette-backed transport.
//!
//! [`VcrTransport`] sits in front of a real [`Transport`] and, depending on
//! its [`Mode`], makes the real call and stores it, serves a stored
//! interaction instead, tries the cassette first and falls back to the
//! network, or stays out of the way entirely.

pub mod adapters;
pub mod cassette;
pub mod censor;
pub mod cli;
pub mod commands;
pub mod config;
pub mod convert;
pub mod delay;
pub mod error;
pub mod matching;
pub mod mode;
pub mod ports;
pub mod vcr;

pub use cassette::{Cassette, Interaction};
pub use censor::{CensorElement, Censors};
pub use config::{AdvancedSettings, Expiration, ExpirationAction, VcrConfig};
pub use delay::DelayPolicy;
pub use error::{StorageError, VcrError};
pub use matching::MatchRules;
pub use mode::Mode;
pub use ports::{HttpRequest, HttpResponse, Transport};
pub use vcr::{Dispatched, Source, VcrTransport};

use clap::Parser;

/// Run the cassette maintenance CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command)
}
