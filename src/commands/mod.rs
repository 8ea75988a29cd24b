//! Command dispatch and handlers.

pub mod censor;
pub mod erase;
pub mod list;

use crate::cassette::store::Cassette;
use crate::cli::{CassetteArgs, Command};
use crate::censor::Censors;

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    match command {
        Command::List(args) => list::run(&open(args)),
        Command::Erase(args) => erase::run(&open(args)),
        Command::Censor {
            cassette,
            headers,
            query_parameters,
            body_keys,
            body_paths,
            text,
        } => {
            let censors = text
                .as_deref()
                .map_or_else(Censors::new, Censors::with_censor_text)
                .censor_headers_by_keys(headers)
                .censor_query_parameters_by_keys(query_parameters)
                .censor_body_elements_by_keys(body_keys)
                .censor_body_paths(body_paths);
            censor::run(&open(cassette), &censors)
        }
    }
}

fn open(args: &CassetteArgs) -> Cassette {
    Cassette::new(&args.folder, args.name.as_str())
}
