//! `httpvcr erase` command.

use crate::cassette::store::Cassette;

/// Execute the `erase` command.
///
/// # Errors
///
/// Returns an error string if the cassette file cannot be removed.
pub fn run(cassette: &Cassette) -> Result<(), String> {
    cassette.erase().map_err(|e| e.to_string())?;
    println!("Erased {}", cassette.location());
    Ok(())
}
