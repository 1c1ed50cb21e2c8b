use thiserror::Error;
use tracing::debug;

use super::{Aabb, Vec2};

pub const DEFAULT_TILE_SIZE: f32 = 32.0;

pub const BASE_LAYER: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    Empty,
    Wall,
    Grass,
    Dirt,
    Water,
}

impl TileKind {
    pub const fn from_id(id: u16) -> Option<Self> {
        match id {
            0 => Some(Self::Empty),
            1 => Some(Self::Wall),
            2 => Some(Self::Grass),
            3 => Some(Self::Dirt),
            4 => Some(Self::Water),
            _ => None,
        }
    }

    pub const fn id(self) -> u16 {
        match self {
            Self::Empty => 0,
            Self::Wall => 1,
            Self::Grass => 2,
            Self::Dirt => 3,
            Self::Water => 4,
        }
    }

    pub const fn is_solid(self) -> bool {
        matches!(self, Self::Wall | Self::Water)
    }
}

fn is_solid_tile_id(id: u16) -> bool {
    TileKind::from_id(id).is_some_and(TileKind::is_solid)
}

/// Stable per-load identity of a map object; survives removal of other objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    /// Payload is either a target level id or the name the item is collected under.
    Item { payload: Option<String> },
    Enemy,
    LayerPortal { target_layer: usize },
    LayerReturn,
}

impl ObjectKind {
    /// Higher fires first when several objects are entered on the same tick.
    pub(crate) fn trigger_priority(&self) -> u8 {
        match self {
            Self::LayerPortal { .. } | Self::LayerReturn => 2,
            Self::Item { .. } => 1,
            Self::Enemy => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Item { .. } => "item",
            Self::Enemy => "enemy",
            Self::LayerPortal { .. } => "layer_portal",
            Self::LayerReturn => "layer_return",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub position: Vec2,
    pub size: Vec2,
    pub layer: usize,
}

impl MapObject {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.position, self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TileGridError {
    #[error("grid must have at least one layer")]
    NoLayers,
    #[error("layer {layer} tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch {
        layer: usize,
        expected: usize,
        actual: usize,
    },
}

/// Layered tile grid. Tile (0,0) covers world pixels `[0, tile_size)` on both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tile_size: f32,
    layers: Vec<Vec<u16>>,
    layer_visible: Vec<bool>,
    active_layer: usize,
    previous_active_layer: usize,
    objects: Vec<MapObject>,
}

impl Default for TileGrid {
    /// A 0x0 grid: every query is out of bounds and therefore solid.
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            tile_size: DEFAULT_TILE_SIZE,
            layers: vec![Vec::new()],
            layer_visible: vec![true],
            active_layer: BASE_LAYER,
            previous_active_layer: BASE_LAYER,
            objects: Vec::new(),
        }
    }
}

impl TileGrid {
    pub fn new(width: u32, height: u32, layers: Vec<Vec<u16>>) -> Result<Self, TileGridError> {
        if layers.is_empty() {
            return Err(TileGridError::NoLayers);
        }
        let expected = width as usize * height as usize;
        for (layer, tiles) in layers.iter().enumerate() {
            if tiles.len() != expected {
                return Err(TileGridError::TileCountMismatch {
                    layer,
                    expected,
                    actual: tiles.len(),
                });
            }
        }
        let layer_count = layers.len();
        Ok(Self {
            width,
            height,
            tile_size: DEFAULT_TILE_SIZE,
            layers,
            layer_visible: vec![true; layer_count],
            active_layer: BASE_LAYER,
            previous_active_layer: BASE_LAYER,
            objects: Vec::new(),
        })
    }

    pub fn with_tile_size(mut self, tile_size: f32) -> Self {
        if tile_size.is_finite() && tile_size > 0.0 {
            self.tile_size = tile_size;
        }
        self
    }

    pub fn with_objects(mut self, objects: Vec<MapObject>) -> Self {
        self.objects = objects;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn active_layer(&self) -> usize {
        self.active_layer
    }

    pub fn previous_active_layer(&self) -> usize {
        self.previous_active_layer
    }

    pub fn world_size(&self) -> Vec2 {
        Vec2 {
            x: self.width as f32 * self.tile_size,
            y: self.height as f32 * self.tile_size,
        }
    }

    fn index_of(&self, tx: i64, ty: i64) -> Option<usize> {
        if tx < 0 || ty < 0 || tx >= self.width as i64 || ty >= self.height as i64 {
            return None;
        }
        Some(ty as usize * self.width as usize + tx as usize)
    }

    pub fn tile_at(&self, layer: usize, tx: i64, ty: i64) -> Option<u16> {
        let index = self.index_of(tx, ty)?;
        self.layers.get(layer)?.get(index).copied()
    }

    pub fn tile_coord(&self, world: f32) -> Option<i64> {
        if !world.is_finite() {
            return None;
        }
        Some((world / self.tile_size).floor() as i64)
    }

    /// Base layer and active layer combined; out of bounds is solid.
    pub fn is_solid_tile(&self, tx: i64, ty: i64) -> bool {
        let Some(index) = self.index_of(tx, ty) else {
            return true;
        };
        let base_solid = is_solid_tile_id(self.layers[BASE_LAYER][index]);
        if base_solid {
            return true;
        }
        self.active_layer != BASE_LAYER && is_solid_tile_id(self.layers[self.active_layer][index])
    }

    pub fn is_solid(&self, x: f32, y: f32) -> bool {
        match (self.tile_coord(x), self.tile_coord(y)) {
            (Some(tx), Some(ty)) => self.is_solid_tile(tx, ty),
            _ => true,
        }
    }

    pub fn switch_layer(&mut self, layer: usize) -> bool {
        if layer >= self.layers.len() {
            debug!(
                layer,
                layer_count = self.layers.len(),
                "layer_switch_out_of_range"
            );
            return false;
        }
        self.previous_active_layer = self.active_layer;
        self.active_layer = layer;
        true
    }

    /// Single-slot swap, not a stack: calling it twice undoes itself.
    pub fn return_to_previous_layer(&mut self) {
        std::mem::swap(&mut self.active_layer, &mut self.previous_active_layer);
    }

    pub fn reset_active_layer(&mut self) {
        self.active_layer = BASE_LAYER;
        self.previous_active_layer = BASE_LAYER;
    }

    pub fn is_layer_visible(&self, layer: usize) -> bool {
        self.layer_visible.get(layer).copied().unwrap_or(false)
    }

    pub fn set_layer_visible(&mut self, layer: usize, visible: bool) -> bool {
        match self.layer_visible.get_mut(layer) {
            Some(slot) => {
                *slot = visible;
                true
            }
            None => false,
        }
    }

    pub fn objects(&self) -> &[MapObject] {
        &self.objects
    }

    pub fn objects_on_layer(&self, layer: usize) -> impl Iterator<Item = &MapObject> {
        self.objects.iter().filter(move |object| object.layer == layer)
    }

    pub fn find_object(&self, id: ObjectId) -> Option<&MapObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    pub fn remove_object(&mut self, id: ObjectId) -> Option<MapObject> {
        let index = self.objects.iter().position(|object| object.id == id)?;
        Some(self.objects.remove(index))
    }
}
