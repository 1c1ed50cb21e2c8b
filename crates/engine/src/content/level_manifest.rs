use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::json::{parse_json_with_path, JsonPathError};
use crate::world::{LevelDescriptor, TransitionPoint, Vec2};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read level manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid level manifest json {0}")]
    Parse(#[from] JsonPathError),
    #[error("level manifest declares no levels")]
    NoLevels,
    #[error("level manifest declares level '{id}' more than once")]
    DuplicateLevel { id: String },
    #[error("level manifest entry {index} has an empty id")]
    EmptyLevelId { index: usize },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    levels: Vec<LevelEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct LevelEntry {
    id: String,
    map_file: String,
    start_x: f32,
    start_y: f32,
    #[serde(default)]
    background: Option<String>,
    #[serde(default)]
    transitions: BTreeMap<String, TransitionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct TransitionEntry {
    x: f32,
    y: f32,
    target_level: String,
}

/// Levels in manifest order; the first one is the initial level.
pub fn parse_level_manifest(text: &str) -> Result<Vec<LevelDescriptor>, ManifestError> {
    let manifest: ManifestFile = parse_json_with_path(text)?;
    if manifest.levels.is_empty() {
        return Err(ManifestError::NoLevels);
    }

    let mut seen = HashSet::<String>::new();
    let mut descriptors = Vec::with_capacity(manifest.levels.len());
    for (index, entry) in manifest.levels.into_iter().enumerate() {
        let id = entry.id.trim().to_string();
        if id.is_empty() {
            return Err(ManifestError::EmptyLevelId { index });
        }
        if !seen.insert(id.clone()) {
            return Err(ManifestError::DuplicateLevel { id });
        }
        let transitions = entry
            .transitions
            .into_iter()
            .map(|(name, transition)| {
                (
                    name,
                    TransitionPoint {
                        position: Vec2::new(transition.x, transition.y),
                        target_level: transition.target_level,
                    },
                )
            })
            .collect();
        descriptors.push(LevelDescriptor {
            id,
            map_file: entry.map_file,
            spawn: Vec2::new(entry.start_x, entry.start_y),
            background: entry.background.filter(|path| !path.trim().is_empty()),
            transitions,
        });
    }
    Ok(descriptors)
}

pub fn load_level_manifest(path: &Path) -> Result<Vec<LevelDescriptor>, ManifestError> {
    let text = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_level_manifest(&text)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const MANIFEST: &str = r#"{
        "levels": [
            {
                "id": "level1",
                "mapFile": "maps/level1.map",
                "startX": 64,
                "startY": 100,
                "background": "textures/sky.png",
                "transitions": {
                    "toLevel2": { "x": 100, "y": 100, "targetLevel": "level2" }
                }
            },
            { "id": "level2", "mapFile": "maps/level2.map", "startX": 32, "startY": 32 }
        ]
    }"#;

    #[test]
    fn parses_levels_in_manifest_order() {
        let levels = parse_level_manifest(MANIFEST).expect("manifest");
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].id, "level1");
        assert_eq!(levels[0].map_file, "maps/level1.map");
        assert_eq!(levels[0].spawn, Vec2::new(64.0, 100.0));
        assert_eq!(levels[0].background.as_deref(), Some("textures/sky.png"));
        let transition = &levels[0].transitions["toLevel2"];
        assert_eq!(transition.position, Vec2::new(100.0, 100.0));
        assert_eq!(transition.target_level, "level2");

        assert!(levels[1].background.is_none());
        assert!(levels[1].transitions.is_empty());
    }

    #[test]
    fn parse_error_carries_json_path() {
        let text = r#"{ "levels": [ { "id": "a", "mapFile": "a.map", "startX": "left", "startY": 0 } ] }"#;
        let error = parse_level_manifest(text).expect_err("bad startX");
        let ManifestError::Parse(inner) = error else {
            panic!("expected parse error, got {error:?}");
        };
        assert_eq!(inner.path, "levels[0].startX");
    }

    #[test]
    fn rejects_empty_and_duplicate_levels() {
        assert!(matches!(
            parse_level_manifest(r#"{ "levels": [] }"#),
            Err(ManifestError::NoLevels)
        ));
        let duplicate = r#"{ "levels": [
            { "id": "a", "mapFile": "a.map", "startX": 0, "startY": 0 },
            { "id": "a", "mapFile": "b.map", "startX": 0, "startY": 0 }
        ] }"#;
        assert!(matches!(
            parse_level_manifest(duplicate),
            Err(ManifestError::DuplicateLevel { id }) if id == "a"
        ));
    }

    #[test]
    fn loads_from_disk() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("levels.json");
        fs::write(&path, MANIFEST).expect("write");
        assert_eq!(load_level_manifest(&path).expect("load").len(), 2);
        assert!(matches!(
            load_level_manifest(&temp.path().join("missing.json")),
            Err(ManifestError::Read { .. })
        ));
    }
}
