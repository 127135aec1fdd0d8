use image::RgbaImage;
use tmx_core::TmxError;
use tmx_parser::LoadedMap;

use crate::emit::{render_sources, Dialect, RenderedSources};
use crate::graphics::{compose_background, encode_bmp, quantize, BackgroundDescriptor};
use crate::model::build_map_model;

/// Every generated file of one map, rendered in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapArtifacts {
    pub name: String,
    pub sources: RenderedSources,
    pub background_descriptor: String,
    /// Absent when the map declares no graphics layers.
    pub background_image: Option<Vec<u8>>,
}

pub fn compile_map(
    map: &LoadedMap,
    tileset_images: &[RgbaImage],
    dialect: Dialect,
) -> Result<MapArtifacts, TmxError> {
    let model = build_map_model(map)?;
    let sources = render_sources(&model, dialect);
    let background_descriptor = BackgroundDescriptor::for_map(&map.dimensions).to_json()?;

    let background_image = match compose_background(map, tileset_images)? {
        Some(canvas) => {
            let backdrop = [map.background.r, map.background.g, map.background.b];
            Some(encode_bmp(&quantize(&canvas, backdrop))?)
        }
        None => None,
    };

    Ok(MapArtifacts {
        name: map.name.clone(),
        sources,
        background_descriptor,
        background_image,
    })
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;
    use crate::compiler_test_support::*;

    #[test]
    fn compile_map_renders_sources_descriptor_and_image() {
        let map = sample_map();
        let images = vec![tileset_image([200, 0, 0, 255], [0, 200, 0, 255])];
        let artifacts = compile_map(&map, &images, Dialect::Butano).expect("map should compile");

        assert_eq!(artifacts.name, "level");
        assert_eq!(artifacts.sources.source_file_name, "bntmx_maps_level.cpp");
        assert!(artifacts.background_descriptor.contains("\"height\": 256"));
        let bmp = artifacts.background_image.expect("graphics layer declared");
        let decoded = image::load_from_memory(&bmp).expect("bmp").to_rgb8();
        assert_eq!(decoded.dimensions(), (256, 256));
    }

    #[test]
    fn compile_map_is_byte_identical_across_runs() {
        let map = sample_map();
        let images = vec![tileset_image([200, 0, 0, 255], [0, 200, 0, 255])];
        for dialect in Dialect::ALL {
            let first = compile_map(&map, &images, dialect).expect("first");
            let second = compile_map(&map, &images, dialect).expect("second");
            assert_eq!(first, second);
        }
    }

    #[test]
    fn compile_map_without_graphics_skips_image() {
        let mut map = sample_map();
        map.graphics_layers.clear();
        let artifacts = compile_map(&map, &[], Dialect::C).expect("map should compile");
        assert!(artifacts.background_image.is_none());
        assert_eq!(artifacts.sources.source_file_name, "bntmx_maps_level.c");
    }
}
