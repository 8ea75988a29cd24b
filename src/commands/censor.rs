//! `httpvcr censor` command.

use crate::cassette::store::Cassette;
use crate::censor::Censors;

/// Execute the `censor` command.
///
/// Applies `censors` to every stored request and response and rewrites the
/// cassette. Running it again with the same censors changes nothing.
///
/// # Errors
///
/// Returns an error string if no selectors are given or the cassette cannot
/// be read or written.
pub fn run(cassette: &Cassette, censors: &Censors) -> Result<(), String> {
    if censors.is_empty() {
        return Err("Nothing to censor: pass --header, --query, --body-key or --body-path".into());
    }
    let count = censor_all(cassette, censors)?;
    println!("Censored {count} interactions in {}", cassette.location());
    Ok(())
}

/// Censor every interaction in `cassette`, returning how many were stored.
///
/// # Errors
///
/// Returns an error string if the cassette cannot be read or written.
pub fn censor_all(cassette: &Cassette, censors: &Censors) -> Result<usize, String> {
    let mut interactions = cassette.read().map_err(|e| e.to_string())?.to_vec();
    for interaction in &mut interactions {
        censors.apply_to_request(&mut interaction.request);
        censors.apply_to_response(&mut interaction.response);
    }
    let count = interactions.len();
    cassette.replace_all(interactions).map_err(|e| e.to_string())?;
    Ok(count)
}
