//! `httpvcr list` command.

use crate::cassette::format::Interaction;
use crate::cassette::store::Cassette;

/// Execute the `list` command.
///
/// Prints one row per stored interaction.
///
/// # Errors
///
/// Returns an error string if the cassette cannot be read.
pub fn run(cassette: &Cassette) -> Result<(), String> {
    let interactions = cassette.read().map_err(|e| e.to_string())?;
    if interactions.is_empty() {
        println!("No interactions in {}.", cassette.location());
        return Ok(());
    }
    for line in render(&interactions) {
        println!("{line}");
    }
    Ok(())
}

/// Format interactions as aligned table rows, header included.
#[must_use]
pub fn render(interactions: &[Interaction]) -> Vec<String> {
    let method_width =
        interactions.iter().map(|i| i.request.method.len()).max().unwrap_or(6).max(6);
    let uri_width = interactions.iter().map(|i| i.request.uri.len()).max().unwrap_or(3).max(3);

    let mut lines = vec![format!(
        "{:>3}  {:<method_width$}  {:<uri_width$}  {:>6}  {:>8}  RECORDED",
        "#", "METHOD", "URI", "STATUS", "MS"
    )];
    lines.extend(interactions.iter().enumerate().map(|(index, interaction)| {
        format!(
            "{:>3}  {:<method_width$}  {:<uri_width$}  {:>6}  {:>8}  {}",
            index,
            interaction.request.method,
            interaction.request.uri,
            interaction.response.status,
            interaction.duration_ms,
            interaction.recorded_at.to_rfc3339(),
        )
    }));
    lines
}
