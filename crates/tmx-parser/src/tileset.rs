use std::fs;
use std::path::{Path, PathBuf};

use tmx_core::{TilesetBinding, TmxError};

use crate::xml::parse_xml;

/// Parses an external tileset document and binds it at `first_gid`.
/// The image path is resolved against the tileset's own directory.
pub fn parse_tileset_document(
    source: &str,
    tileset_path: &Path,
    first_gid: u32,
) -> Result<TilesetBinding, TmxError> {
    let root = parse_xml(source)?;
    if root.name != "tileset" {
        return Err(TmxError::with_span(
            "XML_ROOT_INVALID",
            format!("Expected <tileset> root, got <{}>.", root.name),
            root.location.clone(),
        ));
    }

    let tile_count = root.u32_attr("tilecount")?;
    let columns = root.u32_attr("columns")?;
    if tile_count == 0 || columns == 0 {
        return Err(TmxError::with_span(
            "TILESET_EMPTY",
            "Tilesets must declare at least one tile and one column.",
            root.location.clone(),
        ));
    }

    let Some(image) = root.elements_named("image").next() else {
        return Err(TmxError::with_span(
            "TILESET_IMAGE_MISSING",
            "Only single-image tilesets are supported.",
            root.location.clone(),
        ));
    };
    let Some(last_gid) = first_gid.checked_add(tile_count - 1) else {
        return Err(TmxError::with_span(
            "TILESET_RANGE_INVALID",
            format!(
                "Tileset with {} tiles does not fit after first GID {}.",
                tile_count, first_gid
            ),
            root.location.clone(),
        ));
    };
    let directory = tileset_path.parent().unwrap_or(Path::new("."));

    let name = tileset_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(TilesetBinding {
        name,
        first_gid,
        last_gid,
        tile_width: root.u32_attr("tilewidth")?,
        tile_height: root.u32_attr("tileheight")?,
        columns,
        source: tileset_path.to_path_buf(),
        image: directory.join(image.required_attr("source")?),
    })
}

pub fn read_tileset(tileset_path: &Path, first_gid: u32) -> Result<TilesetBinding, TmxError> {
    let source = fs::read_to_string(tileset_path).map_err(|error| {
        TmxError::new(
            "TILESET_READ",
            format!("Failed to read tileset {}: {}", tileset_path.display(), error),
        )
    })?;
    parse_tileset_document(&source, tileset_path, first_gid)
        .map_err(|error| error.in_file(tileset_path))
}

pub(crate) fn tileset_dependencies(tilesets: &[TilesetBinding]) -> Vec<PathBuf> {
    tilesets
        .iter()
        .flat_map(|tileset| [tileset.source.clone(), tileset.image.clone()])
        .collect()
}
