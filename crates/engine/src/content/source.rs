use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapSourceError {
    #[error("map reference '{reference}' must be a relative path inside the map directory")]
    InvalidReference { reference: String },
    #[error("map '{reference}' not found")]
    NotFound { reference: String },
    #[error("failed to read map file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves a level's map reference to map text.
pub trait MapSource {
    fn read_map(&self, reference: &str) -> Result<String, MapSourceError>;
}

/// Reads `<root>/<reference>` from disk.
#[derive(Debug, Clone)]
pub struct DirMapSource {
    root: PathBuf,
}

impl DirMapSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl MapSource for DirMapSource {
    fn read_map(&self, reference: &str) -> Result<String, MapSourceError> {
        let relative = Path::new(reference);
        let is_contained = !reference.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        if !is_contained {
            return Err(MapSourceError::InvalidReference {
                reference: reference.to_string(),
            });
        }

        let path = self.root.join(relative);
        fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                MapSourceError::NotFound {
                    reference: reference.to_string(),
                }
            } else {
                MapSourceError::Io { path, source }
            }
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryMapSource {
    maps: HashMap<String, String>,
}

impl MemoryMapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_map(mut self, reference: &str, text: &str) -> Self {
        self.insert(reference, text);
        self
    }

    pub fn insert(&mut self, reference: &str, text: &str) {
        self.maps.insert(reference.to_string(), text.to_string());
    }
}

impl MapSource for MemoryMapSource {
    fn read_map(&self, reference: &str) -> Result<String, MapSourceError> {
        self.maps
            .get(reference)
            .cloned()
            .ok_or_else(|| MapSourceError::NotFound {
                reference: reference.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn dir_source_reads_relative_references() {
        let temp = TempDir::new().expect("tempdir");
        fs::create_dir_all(temp.path().join("maps")).expect("create maps");
        fs::write(temp.path().join("maps").join("a.map"), "1,1\n0\n").expect("write");
        let source = DirMapSource::new(temp.path());

        assert_eq!(source.read_map("maps/a.map").expect("read"), "1,1\n0\n");
        assert!(matches!(
            source.read_map("maps/missing.map"),
            Err(MapSourceError::NotFound { .. })
        ));
    }

    #[test]
    fn dir_source_rejects_escaping_references() {
        let temp = TempDir::new().expect("tempdir");
        let source = DirMapSource::new(temp.path());
        assert!(matches!(
            source.read_map("../secret.map"),
            Err(MapSourceError::InvalidReference { .. })
        ));
        assert!(matches!(
            source.read_map(""),
            Err(MapSourceError::InvalidReference { .. })
        ));
    }

    #[test]
    fn memory_source_serves_inserted_maps() {
        let source = MemoryMapSource::new().with_map("level1.map", "2,1\n0,1\n");
        assert_eq!(source.read_map("level1.map").expect("read"), "2,1\n0,1\n");
        assert!(source.read_map("level2.map").is_err());
    }
}
