//! Storage port for durable cassette contents.

use crate::cassette::format::Interaction;
use crate::error::StorageError;

/// Loads and saves the full interaction list of one cassette.
///
/// The encoding is up to the implementation; the cassette only ever
/// reads or replaces the whole sequence.
pub trait CassetteStorage: Send + Sync {
    /// Loads every stored interaction in order. A cassette that does not
    /// exist yet loads as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing exists but cannot be read or decoded.
    fn load_all(&self) -> Result<Vec<Interaction>, StorageError>;

    /// Replaces the stored interactions with `interactions`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn save_all(&self, interactions: &[Interaction]) -> Result<(), StorageError>;

    /// Removes the durable backing entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing exists but cannot be removed.
    fn erase(&self) -> Result<(), StorageError>;

    /// Human-readable location, used in log and error messages.
    fn location(&self) -> String;
}
