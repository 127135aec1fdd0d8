use std::path::{Path, PathBuf};

use tmx_compiler::{compile_map, load_tileset_images};
use tmx_core::{MapDescriptor, TmxError};
use tmx_parser::{
    descriptor_path, map_name, read_descriptor, read_map, read_map_document, MapDocument,
};

pub use tmx_compiler::{
    header_file_name, shared_header, source_file_name, Dialect, MapArtifacts, RenderedSources,
    SHARED_HEADER_FILE_NAME,
};

/// A map file opened together with its sidecar descriptor, ready to be
/// checked for staleness or compiled.
#[derive(Debug, Clone)]
pub struct MapSource {
    pub name: String,
    pub map_path: PathBuf,
    pub descriptor_path: PathBuf,
    pub descriptor: MapDescriptor,
    pub document: MapDocument,
}

pub fn open_map(map_path: &Path) -> Result<MapSource, TmxError> {
    let document = read_map_document(map_path)?;
    let descriptor_path = descriptor_path(map_path);
    let descriptor = read_descriptor(&descriptor_path)?;
    Ok(MapSource {
        name: map_name(map_path),
        map_path: map_path.to_path_buf(),
        descriptor_path,
        descriptor,
        document,
    })
}

impl MapSource {
    /// The map file, its sidecar, then every tileset document and image.
    pub fn input_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.map_path.clone(), self.descriptor_path.clone()];
        paths.extend(self.document.dependencies());
        paths
    }

    pub fn has_graphics(&self) -> bool {
        !self.descriptor.graphics.is_empty()
    }

    pub fn compile(&self, dialect: Dialect) -> Result<MapArtifacts, TmxError> {
        let map = read_map(&self.document, &self.descriptor, &self.name)
            .map_err(|error| error.in_file(&self.map_path))?;
        tracing::debug!(
            map = %self.name,
            graphics = map.graphics_layers.len(),
            objects = map.object_layers.len(),
            tiles = map.tile_layers.len(),
            "layers resolved"
        );
        let tileset_images = if map.graphics_layers.is_empty() {
            Vec::new()
        } else {
            load_tileset_images(&map.tilesets)?
        };
        compile_map(&map, &tileset_images, dialect).map_err(|error| error.in_file(&self.map_path))
    }
}
