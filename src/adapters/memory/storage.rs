//! In-process cassette storage.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cassette::format::Interaction;
use crate::error::StorageError;
use crate::ports::storage::CassetteStorage;

#[derive(Debug, Default)]
struct Shared {
    interactions: Mutex<Vec<Interaction>>,
    loads: AtomicUsize,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

/// Keeps cassette contents in memory.
///
/// Clones share the same contents, so a test can hand one clone to a
/// cassette and inspect or edit the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    shared: Arc<Shared>,
}

impl MemoryStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with `interactions`.
    #[must_use]
    pub fn with_interactions(interactions: Vec<Interaction>) -> Self {
        let storage = Self::new();
        storage.replace(interactions);
        storage
    }

    /// Copy of the stored interactions.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Interaction> {
        self.shared.interactions.lock().clone()
    }

    /// Overwrite the stored interactions, bypassing any cassette.
    pub fn replace(&self, interactions: Vec<Interaction>) {
        *self.shared.interactions.lock() = interactions;
    }

    /// Make every later save fail (or succeed again).
    pub fn fail_saves(&self, fail: bool) {
        self.shared.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of `load_all` calls so far.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.shared.loads.load(Ordering::SeqCst)
    }

    /// Number of successful `save_all` calls so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.shared.saves.load(Ordering::SeqCst)
    }
}

impl CassetteStorage for MemoryStorage {
    fn load_all(&self) -> Result<Vec<Interaction>, StorageError> {
        self.shared.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot())
    }

    fn save_all(&self, interactions: &[Interaction]) -> Result<(), StorageError> {
        if self.shared.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Io {
                path: "memory".into(),
                source: std::io::Error::other("simulated save failure"),
            });
        }
        self.replace(interactions.to_vec());
        self.shared.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn erase(&self) -> Result<(), StorageError> {
        self.replace(Vec::new());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_contents() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        other.save_all(&[]).unwrap();
        assert_eq!(storage.save_count(), 1);
    }

    #[test]
    fn failing_saves_do_not_change_contents() {
        let storage = MemoryStorage::new();
        storage.fail_saves(true);
        assert!(storage.save_all(&[]).is_err());
        assert_eq!(storage.save_count(), 0);
        storage.fail_saves(false);
        assert!(storage.save_all(&[]).is_ok());
    }
}
