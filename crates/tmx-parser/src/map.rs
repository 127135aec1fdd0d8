use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tmx_core::{
    is_identifier, is_reserved_word, LayerRole, LayerSelection, MapDescriptor, MapDimensions,
    ObjectLayer, Rgba, TilesetBinding, TmxError,
};

use crate::layers::{read_objects, resolve_layer};
use crate::tiles::{merge_tile_layers, read_tiles};
use crate::tileset::{read_tileset, tileset_dependencies};
use crate::xml::{parse_xml, XmlElement};

/// A parsed map document with its external tilesets resolved, before any
/// sidecar layer selection is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct MapDocument {
    pub dimensions: MapDimensions,
    pub background: Rgba,
    pub tilesets: Vec<TilesetBinding>,
    pub root: XmlElement,
}

impl MapDocument {
    /// Tileset documents and tileset images, in tileset order.
    pub fn dependencies(&self) -> Vec<PathBuf> {
        tileset_dependencies(&self.tilesets)
    }
}

/// Everything read from one map for the declared output layers.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedMap {
    pub name: String,
    pub dimensions: MapDimensions,
    pub background: Rgba,
    pub tilesets: Vec<TilesetBinding>,
    /// Per output graphics layer, its source tile grids bottom to top.
    pub graphics_layers: Vec<Vec<Vec<u32>>>,
    pub object_layers: Vec<ObjectLayer>,
    /// Per output tiles layer, the merged tile grid.
    pub tile_layers: Vec<Vec<u32>>,
}

pub fn parse_map_document(source: &str, map_path: &Path) -> Result<MapDocument, TmxError> {
    let root = parse_xml(source)?;
    if root.name != "map" {
        return Err(TmxError::with_span(
            "XML_ROOT_INVALID",
            format!("Expected <map> root, got <{}>.", root.name),
            root.location.clone(),
        ));
    }

    let dimensions = MapDimensions {
        width_in_tiles: root.u32_attr("width")?,
        height_in_tiles: root.u32_attr("height")?,
        tile_width: root.u32_attr("tilewidth")?,
        tile_height: root.u32_attr("tileheight")?,
    };
    if dimensions.tile_count() == 0 {
        return Err(TmxError::with_span(
            "MAP_DIMENSIONS_INVALID",
            format!(
                "Map must be at least one tile wide and high, got {}x{}.",
                dimensions.width_in_tiles, dimensions.height_in_tiles
            ),
            root.location.clone(),
        ));
    }
    if dimensions.checked_pixel_size().is_none() {
        return Err(TmxError::with_span(
            "MAP_DIMENSIONS_INVALID",
            format!(
                "Map of {}x{} tiles of {}x{} pixels is too large.",
                dimensions.width_in_tiles,
                dimensions.height_in_tiles,
                dimensions.tile_width,
                dimensions.tile_height
            ),
            root.location.clone(),
        ));
    }

    let background = match root.attr("backgroundcolor") {
        Some(raw) => Rgba::parse_hex(raw)?,
        None => Rgba::TRANSPARENT,
    };

    let directory = map_path.parent().unwrap_or(Path::new("."));
    let mut tilesets: Vec<TilesetBinding> = Vec::new();
    for node in root.elements_named("tileset") {
        let first_gid = node.u32_attr("firstgid")?;
        let Some(source) = node.attr("source") else {
            return Err(TmxError::with_span(
                "TILESET_EMBEDDED_UNSUPPORTED",
                format!(
                    "Tileset at firstgid {} is embedded, only external tilesets are supported.",
                    first_gid
                ),
                node.location.clone(),
            ));
        };
        let binding = read_tileset(&directory.join(source), first_gid)?;
        if let Some(previous) = tilesets
            .iter()
            .find(|previous| {
                previous.contains(binding.first_gid) || binding.contains(previous.first_gid)
            })
        {
            return Err(TmxError::with_span(
                "TILESET_RANGE_OVERLAP",
                format!(
                    "Tileset \"{}\" [{}, {}] overlaps tileset \"{}\" [{}, {}].",
                    binding.name,
                    binding.first_gid,
                    binding.last_gid,
                    previous.name,
                    previous.first_gid,
                    previous.last_gid
                ),
                node.location.clone(),
            ));
        }
        tilesets.push(binding);
    }

    Ok(MapDocument {
        dimensions,
        background,
        tilesets,
        root,
    })
}

/// Applies a sidecar descriptor to a parsed document. Named objects keep
/// their name only if it is a valid identifier, not a keyword and not already
/// taken in the map;
/// otherwise they are downgraded to anonymous with a warning.
pub fn read_map(
    document: &MapDocument,
    descriptor: &MapDescriptor,
    name: &str,
) -> Result<LoadedMap, TmxError> {
    if !is_identifier(name) || is_reserved_word(name) {
        return Err(TmxError::new(
            "MAP_NAME_INVALID",
            format!("Map name \"{}\" is not a valid identifier.", name),
        ));
    }

    let graphics_layers = descriptor
        .graphics
        .iter()
        .map(|selection| read_grids(document, selection, LayerRole::Graphics))
        .collect::<Result<Vec<_>, _>>()?;

    let tile_layers = descriptor
        .tiles
        .iter()
        .map(|selection| {
            read_grids(document, selection, LayerRole::Tiles).map(|grids| merge_tile_layers(&grids))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut taken = BTreeSet::new();
    let mut object_layers = Vec::with_capacity(descriptor.objects.len());
    for selection in &descriptor.objects {
        let mut layer = ObjectLayer::new();
        for path in selection.paths()? {
            let node = resolve_layer(&document.root, &path, LayerRole::Objects)?;
            for mut object in read_objects(node)? {
                if let Some(object_name) = object.name.take() {
                    if !is_identifier(&object_name) {
                        tracing::warn!(
                            map = name,
                            layer = %path,
                            object = %object_name,
                            "object name is not a valid identifier, treating it as anonymous"
                        );
                    } else if is_reserved_word(&object_name) {
                        tracing::warn!(
                            map = name,
                            layer = %path,
                            object = %object_name,
                            "object name is a C/C++ keyword, treating it as anonymous"
                        );
                    } else if !taken.insert(object_name.clone()) {
                        tracing::warn!(
                            map = name,
                            layer = %path,
                            object = %object_name,
                            "duplicate object name, treating it as anonymous"
                        );
                    } else {
                        object.name = Some(object_name);
                    }
                }
                layer.push(object);
            }
        }
        object_layers.push(layer);
    }

    Ok(LoadedMap {
        name: name.to_string(),
        dimensions: document.dimensions,
        background: document.background,
        tilesets: document.tilesets.clone(),
        graphics_layers,
        object_layers,
        tile_layers,
    })
}

fn read_grids(
    document: &MapDocument,
    selection: &LayerSelection,
    role: LayerRole,
) -> Result<Vec<Vec<u32>>, TmxError> {
    let expected = document.dimensions.tile_count();
    selection
        .paths()?
        .iter()
        .map(|path| read_tiles(resolve_layer(&document.root, path, role)?, expected))
        .collect()
}

/// The sidecar descriptor of a map: the same path with a `.json` extension.
pub fn descriptor_path(map_path: &Path) -> PathBuf {
    map_path.with_extension("json")
}

pub fn map_name(map_path: &Path) -> String {
    map_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn read_map_document(map_path: &Path) -> Result<MapDocument, TmxError> {
    let source = fs::read_to_string(map_path).map_err(|error| {
        TmxError::new(
            "MAP_READ",
            format!("Failed to read map {}: {}", map_path.display(), error),
        )
    })?;
    parse_map_document(&source, map_path).map_err(|error| error.in_file(map_path))
}

pub fn read_descriptor(path: &Path) -> Result<MapDescriptor, TmxError> {
    let source = fs::read_to_string(path).map_err(|error| {
        TmxError::new(
            "DESCRIPTOR_READ",
            format!("Failed to read descriptor {}: {}", path.display(), error),
        )
    })?;
    MapDescriptor::from_json_str(&source).map_err(|error| error.in_file(path))
}
