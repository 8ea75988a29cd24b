//! YAML file storage for cassettes.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::cassette::format::{CassetteDocument, Interaction};
use crate::error::StorageError;
use crate::ports::storage::CassetteStorage;

/// File extension appended to cassette names.
pub const CASSETTE_EXTENSION: &str = "cassette.yaml";

/// Stores a cassette as a single YAML document on disk.
#[derive(Debug, Clone)]
pub struct YamlFileStorage {
    path: PathBuf,
    name: String,
}

impl YamlFileStorage {
    /// Storage at an explicit file path.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self { path: path.into(), name: name.into() }
    }

    /// Storage at `<folder>/<name>.cassette.yaml`.
    #[must_use]
    pub fn in_folder(folder: &Path, name: &str) -> Self {
        Self::new(folder.join(format!("{name}.{CASSETTE_EXTENSION}")), name)
    }

    /// Path of the cassette file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io { path: self.path.clone(), source }
    }

    fn encoding_error(&self, source: serde_yaml::Error) -> StorageError {
        StorageError::Encoding { location: self.location(), source: Box::new(source) }
    }
}

impl CassetteStorage for YamlFileStorage {
    fn load_all(&self) -> Result<Vec<Interaction>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let document: CassetteDocument =
            serde_yaml::from_str(&content).map_err(|e| self.encoding_error(e))?;
        Ok(document.interactions)
    }

    fn save_all(&self, interactions: &[Interaction]) -> Result<(), StorageError> {
        let document =
            CassetteDocument { name: self.name.clone(), interactions: interactions.to_vec() };
        let yaml = serde_yaml::to_string(&document).map_err(|e| self.encoding_error(e))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, yaml).map_err(|e| self.io_error(e))
    }

    fn erase(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::cassette::format::{Body, CapturedRequest, CapturedResponse};

    fn interaction() -> Interaction {
        Interaction {
            request: CapturedRequest {
                method: "GET".into(),
                uri: "https://api.example.com/items/42".into(),
                headers: vec![("accept".into(), "application/json".into())],
                body: Body::default(),
            },
            response: CapturedResponse {
                status: 200,
                headers: Vec::new(),
                body: Body::Text(r#"{"id":42}"#.into()),
            },
            recorded_at: Utc::now(),
            duration_ms: 30,
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = std::env::temp_dir().join("httpvcr_yaml_missing");
        let storage = YamlFileStorage::in_folder(&dir, "absent");
        assert!(storage.load_all().unwrap().is_empty());
        assert!(storage.erase().is_ok());
    }

    #[test]
    fn save_then_load_creates_folder() {
        let dir = std::env::temp_dir().join("httpvcr_yaml_save_load");
        let _ = std::fs::remove_dir_all(&dir);
        let storage = YamlFileStorage::in_folder(&dir.join("nested"), "items");

        storage.save_all(&[interaction()]).unwrap();
        assert!(storage.path().ends_with("nested/items.cassette.yaml"));

        let loaded = storage.load_all().unwrap();
        assert_eq!(loaded, vec![interaction_with(&loaded[0])]);

        let content = std::fs::read_to_string(storage.path()).unwrap();
        assert!(content.contains("name: items"));

        storage.erase().unwrap();
        assert!(!storage.path().exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    fn interaction_with(loaded: &Interaction) -> Interaction {
        Interaction { recorded_at: loaded.recorded_at, ..interaction() }
    }

    #[test]
    fn corrupt_file_is_encoding_error() {
        let dir = std::env::temp_dir().join("httpvcr_yaml_corrupt");
        std::fs::create_dir_all(&dir).unwrap();
        let storage = YamlFileStorage::in_folder(&dir, "broken");
        std::fs::write(storage.path(), "interactions: [not, a, cassette").unwrap();

        let err = storage.load_all().unwrap_err();
        assert!(matches!(err, StorageError::Encoding { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
