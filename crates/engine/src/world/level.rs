use std::collections::{BTreeMap, HashMap};

use thiserror::Error;
use tracing::warn;

use super::{TileGrid, Vec2, DEFAULT_TILE_SIZE};
use crate::content::{parse_map, MapError, MapSource, MapSourceError};

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPoint {
    pub position: Vec2,
    pub target_level: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelDescriptor {
    pub id: String,
    pub map_file: String,
    pub spawn: Vec2,
    pub background: Option<String>,
    /// Keyed by name; iteration order is the check order.
    pub transitions: BTreeMap<String, TransitionPoint>,
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("unknown level '{id}'")]
    UnknownLevel { id: String },
    #[error("level '{id}' map could not be read: {source}")]
    MapSource {
        id: String,
        #[source]
        source: MapSourceError,
    },
    #[error("level '{id}' map is malformed: {source}")]
    Map {
        id: String,
        #[source]
        source: MapError,
    },
}

/// Level id -> grid loading parameters, plus the current-level pointer.
#[derive(Debug, Clone)]
pub struct LevelRegistry {
    levels: Vec<LevelDescriptor>,
    by_id: HashMap<String, usize>,
    current: Option<usize>,
    tile_size: f32,
}

impl LevelRegistry {
    /// Later duplicates of an id are ignored.
    pub fn new(levels: Vec<LevelDescriptor>) -> Self {
        let mut kept = Vec::with_capacity(levels.len());
        let mut by_id = HashMap::with_capacity(levels.len());
        for level in levels {
            if by_id.contains_key(&level.id) {
                warn!(level = %level.id, "duplicate_level_ignored");
                continue;
            }
            by_id.insert(level.id.clone(), kept.len());
            kept.push(level);
        }
        let registry = Self {
            levels: kept,
            by_id,
            current: None,
            tile_size: DEFAULT_TILE_SIZE,
        };
        registry.warn_dangling_transitions();
        registry
    }

    pub fn with_tile_size(mut self, tile_size: f32) -> Self {
        if tile_size.is_finite() && tile_size > 0.0 {
            self.tile_size = tile_size;
        }
        self
    }

    fn warn_dangling_transitions(&self) {
        for level in &self.levels {
            for (name, transition) in &level.transitions {
                if !self.contains(&transition.target_level) {
                    warn!(
                        level = %level.id,
                        transition = %name,
                        target = %transition.target_level,
                        "transition_target_unknown"
                    );
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn descriptor(&self, id: &str) -> Option<&LevelDescriptor> {
        self.by_id.get(id).map(|&index| &self.levels[index])
    }

    pub fn initial_level(&self) -> Option<&LevelDescriptor> {
        self.levels.first()
    }

    pub fn current(&self) -> Option<&LevelDescriptor> {
        self.current.map(|index| &self.levels[index])
    }

    pub fn current_level_id(&self) -> Option<&str> {
        self.current().map(|level| level.id.as_str())
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Builds the level's grid; the current pointer moves only on success.
    pub fn load_grid(&mut self, id: &str, maps: &dyn MapSource) -> Result<TileGrid, LevelError> {
        let index = *self.by_id.get(id).ok_or_else(|| LevelError::UnknownLevel {
            id: id.to_string(),
        })?;
        let descriptor = &self.levels[index];
        let text = maps
            .read_map(&descriptor.map_file)
            .map_err(|source| LevelError::MapSource {
                id: id.to_string(),
                source,
            })?;
        let grid = parse_map(&text, self.tile_size).map_err(|source| LevelError::Map {
            id: id.to_string(),
            source,
        })?;
        self.current = Some(index);
        Ok(grid)
    }

    /// First transition of the current level, in name order, within `tolerance` of `position`.
    pub fn find_transition(
        &self,
        position: Vec2,
        tolerance: Vec2,
    ) -> Option<(&str, &TransitionPoint)> {
        let level = self.current()?;
        level
            .transitions
            .iter()
            .find(|(_, point)| {
                (position.x - point.position.x).abs() < tolerance.x
                    && (position.y - point.position.y).abs() < tolerance.y
            })
            .map(|(name, point)| (name.as_str(), point))
    }
}
