//! Named, durable collection of recorded interactions.

use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use super::format::Interaction;
use crate::adapters::live::storage::YamlFileStorage;
use crate::error::StorageError;
use crate::matching::MatchRules;
use crate::ports::storage::CassetteStorage;

/// A cassette: an ordered list of interactions backed by durable storage.
///
/// Contents are loaded lazily on the first read and cached. Writers are
/// serialized; each write re-reads the backing before replacing it, and
/// external edits made between those two steps are lost (last writer wins).
pub struct Cassette {
    name: String,
    storage: Box<dyn CassetteStorage>,
    cache: RwLock<Option<Arc<Vec<Interaction>>>>,
    writer: Mutex<()>,
}

impl Cassette {
    /// A cassette stored as `<folder>/<name>.cassette.yaml`.
    pub fn new(folder: impl AsRef<Path>, name: impl Into<String>) -> Self {
        let name = name.into();
        let storage = YamlFileStorage::in_folder(folder.as_ref(), &name);
        Self::with_storage(name, Box::new(storage))
    }

    /// A cassette backed by an arbitrary storage implementation.
    pub fn with_storage(name: impl Into<String>, storage: Box<dyn CassetteStorage>) -> Self {
        Self { name: name.into(), storage, cache: RwLock::new(None), writer: Mutex::new(()) }
    }

    /// Cassette name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the cassette is stored.
    #[must_use]
    pub fn location(&self) -> String {
        self.storage.location()
    }

    /// All interactions in stored order.
    ///
    /// # Errors
    ///
    /// Returns an error if the first load from storage fails.
    pub fn read(&self) -> Result<Arc<Vec<Interaction>>, StorageError> {
        if let Some(cached) = self.cache.read().as_ref() {
            return Ok(Arc::clone(cached));
        }
        let _writer = self.writer.lock();
        if let Some(cached) = self.cache.read().as_ref() {
            return Ok(Arc::clone(cached));
        }
        let loaded = Arc::new(self.storage.load_all()?);
        debug!(cassette = %self.name, count = loaded.len(), "loaded cassette");
        *self.cache.write() = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// The cached interactions, if the cassette has been loaded.
    ///
    /// Never touches storage and never waits for a writer.
    #[must_use]
    pub fn cached(&self) -> Option<Arc<Vec<Interaction>>> {
        self.cache.read().as_ref().map(Arc::clone)
    }

    /// Number of stored interactions.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be loaded.
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.read()?.len())
    }

    /// Returns `true` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be loaded.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.read()?.is_empty())
    }

    /// Store `interaction`, replacing the first stored interaction whose
    /// request matches under `rules` or appending if none does.
    ///
    /// With `bypass_search` the interaction is appended without searching;
    /// the caller guarantees no match exists. The write is durable when this
    /// returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing cannot be read or written. The cached
    /// contents are left unchanged in that case.
    pub fn upsert(
        &self,
        interaction: Interaction,
        rules: &MatchRules,
        bypass_search: bool,
    ) -> Result<(), StorageError> {
        let _writer = self.writer.lock();
        let mut interactions = self.storage.load_all()?;
        let existing = if bypass_search {
            None
        } else {
            rules.position(&interaction.request, interactions.iter().map(|i| &i.request))
        };
        match existing {
            Some(index) => interactions[index] = interaction,
            None => interactions.push(interaction),
        }
        self.storage.save_all(&interactions)?;
        debug!(cassette = %self.name, replaced = existing.is_some(), "stored interaction");
        *self.cache.write() = Some(Arc::new(interactions));
        Ok(())
    }

    /// Replace the whole cassette with `interactions`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn replace_all(&self, interactions: Vec<Interaction>) -> Result<(), StorageError> {
        let _writer = self.writer.lock();
        self.storage.save_all(&interactions)?;
        *self.cache.write() = Some(Arc::new(interactions));
        Ok(())
    }

    /// Delete the durable backing and forget cached contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing cannot be removed.
    pub fn erase(&self) -> Result<(), StorageError> {
        let _writer = self.writer.lock();
        self.storage.erase()?;
        *self.cache.write() = None;
        Ok(())
    }
}

impl std::fmt::Debug for Cassette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cassette")
            .field("name", &self.name)
            .field("location", &self.storage.location())
            .finish_non_exhaustive()
    }
}
