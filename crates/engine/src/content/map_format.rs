//! Line-oriented map text format.
//!
//! ```text
//! width,height,layerCount
//! <layerCount blocks of `height` rows, `width` comma-separated tile ids each>
//! type,x,y[,layer[,payload]]
//! ```
//!
//! Blank lines between blocks are allowed. A two-field header means one layer.

use std::num::ParseIntError;

use thiserror::Error;
use tracing::{debug, warn};

use crate::world::{MapObject, ObjectId, ObjectKind, TileGrid, TileGridError, TileKind, Vec2};

const OBJECT_TYPE_ITEM: u8 = 1;
const OBJECT_TYPE_ENEMY: u8 = 2;
const OBJECT_TYPE_LAYER_PORTAL: u8 = 3;
const OBJECT_TYPE_LAYER_RETURN: u8 = 4;
const ITEM_SIZE_PX: f32 = 16.0;
const ENEMY_SIZE_PX: f32 = 32.0;
const DEFAULT_PORTAL_TARGET_LAYER: usize = 1;
/// Upper bound on `width * height * layerCount` accepted from a header.
const MAX_MAP_CELLS: u64 = 1 << 22;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("map text is empty")]
    Empty,
    #[error("invalid header on line {line}: {message}")]
    InvalidHeader { line: usize, message: String },
    #[error("invalid tile id '{value}' at line {line}, column {column}: {source}")]
    InvalidTile {
        line: usize,
        column: usize,
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("layer {layer} ends after {found} of {expected} rows")]
    MissingRows {
        layer: usize,
        expected: u32,
        found: u32,
    },
    #[error(transparent)]
    Grid(#[from] TileGridError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MapHeader {
    width: u32,
    height: u32,
    layer_count: usize,
}

/// Parses into a fresh grid; the caller swaps it in only on success.
pub fn parse_map(text: &str, tile_size: f32) -> Result<TileGrid, MapError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()));

    let (header_line, header_text) = lines
        .by_ref()
        .find(|(_, line)| !line.is_empty())
        .ok_or(MapError::Empty)?;
    let header = parse_header(header_line, header_text)?;

    let cells_per_layer = header.width as usize * header.height as usize;
    let mut layers = Vec::with_capacity(header.layer_count);
    for layer in 0..header.layer_count {
        // Rows that are never reached stay zeroed in the discarded buffer.
        let mut tiles = vec![0u16; cells_per_layer];
        for row in 0..header.height {
            let Some((line_number, row_text)) =
                lines.by_ref().find(|(_, line)| !line.is_empty())
            else {
                return Err(MapError::MissingRows {
                    layer,
                    expected: header.height,
                    found: row,
                });
            };
            let row_start = row as usize * header.width as usize;
            parse_row(
                line_number,
                row_text,
                &mut tiles[row_start..row_start + header.width as usize],
            )?;
        }
        layers.push(tiles);
    }

    let mut objects = Vec::new();
    let mut next_id = 0u32;
    for (line_number, record) in lines.filter(|(_, line)| !line.is_empty()) {
        let id = ObjectId(next_id);
        if let Some(object) = parse_object(line_number, record, id, &header, tile_size) {
            objects.push(object);
            next_id = next_id.saturating_add(1);
        }
    }

    Ok(TileGrid::new(header.width, header.height, layers)?
        .with_tile_size(tile_size)
        .with_objects(objects))
}

fn parse_header(line: usize, text: &str) -> Result<MapHeader, MapError> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    if !(2..=3).contains(&fields.len()) {
        return Err(MapError::InvalidHeader {
            line,
            message: format!("expected 'width,height[,layerCount]', got '{text}'"),
        });
    }
    let parse_field = |name: &str, value: &str| {
        value
            .parse::<u32>()
            .map_err(|error| MapError::InvalidHeader {
                line,
                message: format!("{name} '{value}': {error}"),
            })
    };
    let width = parse_field("width", fields[0])?;
    let height = parse_field("height", fields[1])?;
    let layer_count = match fields.get(2) {
        Some(value) => parse_field("layerCount", value)?,
        None => 1,
    };
    if width == 0 || height == 0 || layer_count == 0 {
        return Err(MapError::InvalidHeader {
            line,
            message: format!(
                "dimensions must be non-zero, got {width}x{height} with {layer_count} layers"
            ),
        });
    }
    let cells = u64::from(width)
        .checked_mul(u64::from(height))
        .and_then(|cells| cells.checked_mul(u64::from(layer_count)))
        .filter(|cells| *cells <= MAX_MAP_CELLS);
    if cells.is_none() {
        return Err(MapError::InvalidHeader {
            line,
            message: format!(
                "{width}x{height} with {layer_count} layers exceeds {MAX_MAP_CELLS} cells"
            ),
        });
    }
    Ok(MapHeader {
        width,
        height,
        layer_count: layer_count as usize,
    })
}

/// Short rows leave their trailing cells at 0.
fn parse_row(line: usize, text: &str, out: &mut [u16]) -> Result<(), MapError> {
    for (column, (slot, raw)) in out.iter_mut().zip(text.split(',')).enumerate() {
        let value = raw.trim();
        let id = value
            .parse::<u16>()
            .map_err(|source| MapError::InvalidTile {
                line,
                column: column + 1,
                value: value.to_string(),
                source,
            })?;
        *slot = match TileKind::from_id(id) {
            Some(kind) => kind.id(),
            None => {
                debug!(line, column = column + 1, tile_id = id, "unknown_tile_id_as_empty");
                TileKind::Empty.id()
            }
        };
    }
    Ok(())
}

fn parse_object(
    line: usize,
    text: &str,
    id: ObjectId,
    header: &MapHeader,
    tile_size: f32,
) -> Option<MapObject> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    if fields.len() < 3 {
        warn!(line, record = text, "map_object_record_too_short");
        return None;
    }
    let (Ok(object_type), Ok(x), Ok(y)) = (
        fields[0].parse::<u8>(),
        fields[1].parse::<f32>(),
        fields[2].parse::<f32>(),
    ) else {
        warn!(line, record = text, "map_object_record_malformed");
        return None;
    };
    let layer = match fields.get(3) {
        Some(value) => match value.parse::<usize>() {
            Ok(layer) => layer,
            Err(_) => {
                warn!(line, record = text, "map_object_layer_malformed");
                return None;
            }
        },
        None => 0,
    };
    if layer >= header.layer_count {
        debug!(line, layer, layer_count = header.layer_count, "map_object_layer_missing");
        return None;
    }
    let payload = fields
        .get(4)
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string());

    let (kind, size) = match object_type {
        OBJECT_TYPE_ITEM => (ObjectKind::Item { payload }, ITEM_SIZE_PX),
        OBJECT_TYPE_ENEMY => (ObjectKind::Enemy, ENEMY_SIZE_PX),
        OBJECT_TYPE_LAYER_PORTAL => {
            let target_layer = payload
                .and_then(|value| value.parse::<usize>().ok())
                .unwrap_or(DEFAULT_PORTAL_TARGET_LAYER);
            (ObjectKind::LayerPortal { target_layer }, tile_size)
        }
        OBJECT_TYPE_LAYER_RETURN => (ObjectKind::LayerReturn, tile_size),
        other => {
            debug!(line, object_type = other, "unknown_object_type_skipped");
            return None;
        }
    };

    Some(MapObject {
        id,
        kind,
        position: Vec2 { x, y },
        size: Vec2 { x: size, y: size },
        layer,
    })
}
