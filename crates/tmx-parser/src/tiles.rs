use tmx_core::{TmxError, GID_MASK};

use crate::xml::XmlElement;

/// Generated tile tables store `uint16_t` cells.
const MAX_TILE_ID: u32 = u16::MAX as u32;

/// Reads the CSV tile data of a `<layer>` node, masking flip flags, and
/// checks it holds exactly `expected` tiles.
pub fn read_tiles(layer: &XmlElement, expected: usize) -> Result<Vec<u32>, TmxError> {
    let layer_name = layer.attr("name").unwrap_or_default();
    let Some(data) = layer.elements_named("data").next() else {
        return Err(TmxError::with_span(
            "TILE_DATA_MISSING",
            format!("Tiles layer \"{}\" has no <data> element.", layer_name),
            layer.location.clone(),
        ));
    };

    let encoding = data.attr("encoding").unwrap_or("xml");
    if encoding != "csv" {
        return Err(TmxError::with_span(
            "TILE_ENCODING_UNSUPPORTED",
            format!(
                "Tiles layer \"{}\" uses \"{}\" encoding, only \"csv\" is supported.",
                layer_name, encoding
            ),
            data.location.clone(),
        ));
    }

    let mut tiles = Vec::with_capacity(expected);
    for cell in data
        .text
        .lines()
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
    {
        let gid = cell.parse::<u32>().map_err(|_| {
            TmxError::with_span(
                "TILE_ID_INVALID",
                format!("Tiles layer \"{}\" has invalid tile ID \"{}\".", layer_name, cell),
                data.location.clone(),
            )
        })?;
        let tile = gid & GID_MASK;
        if tile > MAX_TILE_ID {
            return Err(TmxError::with_span(
                "TILE_ID_TOO_LARGE",
                format!(
                    "Tiles layer \"{}\" uses tile ID {}, generated tiles are limited to {}.",
                    layer_name, tile, MAX_TILE_ID
                ),
                data.location.clone(),
            ));
        }
        tiles.push(tile);
    }

    if tiles.len() != expected {
        return Err(TmxError::with_span(
            "TILE_COUNT_MISMATCH",
            format!(
                "Tiles layer \"{}\" has an invalid number of tiles, expected {}, got {}.",
                layer_name,
                expected,
                tiles.len()
            ),
            data.location.clone(),
        ));
    }

    Ok(tiles)
}

/// Stacks same-sized tile grids listed bottom to top: each cell takes the
/// topmost non-zero tile, or zero when every layer is empty there.
pub fn merge_tile_layers(layers: &[Vec<u32>]) -> Vec<u32> {
    let Some(first) = layers.first() else {
        return Vec::new();
    };
    (0..first.len())
        .map(|cell| {
            layers
                .iter()
                .rev()
                .map(|layer| layer[cell])
                .find(|&tile| tile != 0)
                .unwrap_or(0)
        })
        .collect()
}
