mod emit;
mod flatten;
mod graphics;
mod model;
mod pipeline;

pub use emit::{
    header_file_name, render_sources, shared_header, source_file_name, Dialect,
    RenderedSources, SHARED_HEADER_FILE_NAME,
};
pub use flatten::{
    flatten_objects, object_classes, tileset_members, EnumMember, FlatObject, FlatObjects,
    IndexWidth, ObjectSpan,
};
pub use graphics::{
    background_size, compose_background, encode_bmp, load_tileset_images, quantize,
    BackgroundDescriptor, IndexedImage,
};
pub use model::{build_map_model, EnumDecl, EnumKind, MapModel, ObjectRecord, ObjectRef};
pub use pipeline::{compile_map, MapArtifacts};

#[cfg(test)]
pub(crate) mod compiler_test_support {
    use std::path::PathBuf;

    use image::{Rgba as Pixel, RgbaImage};
    use tmx_core::{MapDimensions, MapObject, ObjectLayer, Rgba, TilesetBinding};
    use tmx_parser::LoadedMap;

    /// Objects as `(name, class)` pairs in discovery order; an empty name is
    /// anonymous. Positions are spread out so they can be told apart.
    pub(crate) fn object_layer(objects: &[(&str, &str)]) -> ObjectLayer {
        let mut layer = ObjectLayer::new();
        for (position, (name, class)) in objects.iter().enumerate() {
            let name = (!name.is_empty()).then(|| name.to_string());
            layer.push(MapObject::from_rect(position as i32, 0, 0, 0, name, *class));
        }
        layer
    }

    pub(crate) fn tileset(name: &str, first_gid: u32, last_gid: u32) -> TilesetBinding {
        TilesetBinding {
            name: name.to_string(),
            first_gid,
            last_gid,
            tile_width: 8,
            tile_height: 8,
            columns: 2,
            source: PathBuf::from(format!("{}.tsx", name)),
            image: PathBuf::from(format!("{}.png", name)),
        }
    }

    /// A 16x16 sheet of four 8x8 tiles: the first and last tiles are filled
    /// with the given colours, the others are transparent.
    pub(crate) fn tileset_image(first: [u8; 4], last: [u8; 4]) -> RgbaImage {
        RgbaImage::from_fn(16, 16, |x, y| match (x < 8, y < 8) {
            (true, true) => Pixel(first),
            (false, false) => Pixel(last),
            _ => Pixel([0, 0, 0, 0]),
        })
    }

    /// A 3x2 map of 8x8 tiles with objects layers `[door]` and
    /// `[boss (enemy), anonymous]`, one tiles layer and one graphics layer.
    pub(crate) fn sample_map() -> LoadedMap {
        let mut first = ObjectLayer::new();
        first.push(MapObject::from_rect(10, 40, 16, 16, Some("door".to_string()), ""));
        let mut second = ObjectLayer::new();
        second.push(MapObject::from_rect(0, 0, 8, 8, Some("boss".to_string()), "enemy"));
        second.push(MapObject::from_rect(8, 8, 0, 0, None, ""));

        LoadedMap {
            name: "level".to_string(),
            dimensions: MapDimensions {
                width_in_tiles: 3,
                height_in_tiles: 2,
                tile_width: 8,
                tile_height: 8,
            },
            background: Rgba::TRANSPARENT,
            tilesets: vec![tileset("terrain", 1, 4)],
            graphics_layers: vec![vec![vec![1, 2, 3, 4, 0, 1]]],
            object_layers: vec![first, second],
            tile_layers: vec![vec![0, 5, 2, 0, 0, 2]],
        }
    }
}
