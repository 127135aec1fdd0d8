use std::collections::HashMap;

use color_quant::NeuQuant;
use image::codecs::bmp::BmpEncoder;
use image::{imageops, ExtendedColorType, Rgba as Pixel, RgbaImage};
use serde::Serialize;
use tmx_core::{MapDimensions, TilesetBinding, TmxError};
use tmx_parser::LoadedMap;

const BACKGROUND_GRANULARITY: u32 = 256;
const MAX_PALETTE_COLORS: usize = 256;
const NEUQUANT_SAMPLE_FACTOR: i32 = 10;

/// Rounds a map size in pixels up to the next multiple of 256.
pub fn background_size(size: u32) -> u32 {
    if size % BACKGROUND_GRANULARITY == 0 {
        size
    } else {
        (size / BACKGROUND_GRANULARITY + 1) * BACKGROUND_GRANULARITY
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackgroundDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub bpp_mode: String,
    pub height: u32,
}

impl BackgroundDescriptor {
    pub fn for_map(dimensions: &MapDimensions) -> Self {
        Self {
            kind: "regular_bg".to_string(),
            bpp_mode: "bpp_4_auto".to_string(),
            height: background_size(dimensions.height_in_pixels()),
        }
    }

    pub fn to_json(&self) -> Result<String, TmxError> {
        let mut bytes = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
        self.serialize(&mut serializer)
            .map_err(|error| TmxError::new("DESCRIPTOR_WRITE", error.to_string()))?;
        let mut json = String::from_utf8(bytes)
            .map_err(|error| TmxError::new("DESCRIPTOR_WRITE", error.to_string()))?;
        json.push('\n');
        Ok(json)
    }
}

pub fn load_tileset_images(tilesets: &[TilesetBinding]) -> Result<Vec<RgbaImage>, TmxError> {
    tilesets
        .iter()
        .map(|tileset| {
            image::open(&tileset.image)
                .map(|decoded| decoded.to_rgba8())
                .map_err(|error| {
                    TmxError::new(
                        "IMAGE_READ",
                        format!(
                            "Failed to load tileset image {}: {}",
                            tileset.image.display(),
                            error
                        ),
                    )
                })
        })
        .collect()
}

/// Stacks every graphics layer of the map into one image, one background
/// tall slot per layer, each layer centred in its slot. `None` when the map
/// declares no graphics layers.
pub fn compose_background(
    map: &LoadedMap,
    tileset_images: &[RgbaImage],
) -> Result<Option<RgbaImage>, TmxError> {
    if map.graphics_layers.is_empty() {
        return Ok(None);
    }

    let dimensions = &map.dimensions;
    let oversized = || {
        TmxError::new(
            "MAP_DIMENSIONS_INVALID",
            format!(
                "Background of map \"{}\" with {} graphics layers is too large.",
                map.name,
                map.graphics_layers.len()
            ),
        )
    };
    let (width, height) = dimensions.checked_pixel_size().ok_or_else(oversized)?;
    let (bg_width, bg_height) = (background_size(width), background_size(height));
    let canvas_height = u32::try_from(map.graphics_layers.len())
        .ok()
        .and_then(|slots| bg_height.checked_mul(slots))
        .ok_or_else(oversized)?;
    let (offset_x, offset_y) = ((bg_width - width) / 2, (bg_height - height) / 2);
    let background = map.background;
    let mut canvas = RgbaImage::from_pixel(
        bg_width,
        canvas_height,
        Pixel([background.r, background.g, background.b, background.a]),
    );

    let columns = dimensions.width_in_tiles.max(1) as usize;
    for (slot, stack) in map.graphics_layers.iter().enumerate() {
        let slot_y = bg_height * slot as u32;
        for grid in stack {
            for (cell, &gid) in grid.iter().enumerate() {
                if gid == 0 {
                    continue;
                }
                let Some((tileset, sheet)) = map
                    .tilesets
                    .iter()
                    .zip(tileset_images)
                    .find(|(tileset, _)| tileset.contains(gid))
                else {
                    continue;
                };
                let local = gid - tileset.first_gid;
                let tile = imageops::crop_imm(
                    sheet,
                    (local % tileset.columns) * tileset.tile_width,
                    (local / tileset.columns) * tileset.tile_height,
                    tileset.tile_width,
                    tileset.tile_height,
                )
                .to_image();
                let x = offset_x + (cell % columns) as u32 * dimensions.tile_width;
                let y = slot_y + offset_y + (cell / columns) as u32 * dimensions.tile_height;
                imageops::overlay(&mut canvas, &tile, i64::from(x), i64::from(y));
            }
        }
    }
    Ok(Some(canvas))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    pub width: u32,
    pub height: u32,
    pub palette: Vec<[u8; 3]>,
    pub indices: Vec<u8>,
}

/// Reduces an image to at most 256 colours, ignoring alpha. `first` is given
/// palette index 0. Images with few enough colours keep them exactly, in
/// first-seen raster order; others go through NeuQuant.
pub fn quantize(image: &RgbaImage, first: [u8; 3]) -> IndexedImage {
    let mut palette = vec![first];
    let mut lookup = HashMap::from([(first, 0u8)]);
    let mut indices = Vec::with_capacity(image.len() / 4);

    for pixel in image.pixels() {
        let rgb = [pixel[0], pixel[1], pixel[2]];
        if let Some(&index) = lookup.get(&rgb) {
            indices.push(index);
            continue;
        }
        if palette.len() == MAX_PALETTE_COLORS {
            return neuquant(image);
        }
        let index = palette.len() as u8;
        palette.push(rgb);
        lookup.insert(rgb, index);
        indices.push(index);
    }

    IndexedImage {
        width: image.width(),
        height: image.height(),
        palette,
        indices,
    }
}

fn neuquant(image: &RgbaImage) -> IndexedImage {
    tracing::debug!(
        width = image.width(),
        height = image.height(),
        "more than 256 colours, quantizing with NeuQuant"
    );
    let opaque = image
        .pixels()
        .flat_map(|pixel| [pixel[0], pixel[1], pixel[2], 0xFF])
        .collect::<Vec<_>>();
    let quantizer = NeuQuant::new(NEUQUANT_SAMPLE_FACTOR, MAX_PALETTE_COLORS, &opaque);
    let palette = quantizer
        .color_map_rgb()
        .chunks_exact(3)
        .map(|rgb| [rgb[0], rgb[1], rgb[2]])
        .collect();
    let indices = opaque
        .chunks_exact(4)
        .map(|pixel| quantizer.index_of(pixel) as u8)
        .collect();
    IndexedImage {
        width: image.width(),
        height: image.height(),
        palette,
        indices,
    }
}

/// Writes an 8-bit paletted BMP.
pub fn encode_bmp(image: &IndexedImage) -> Result<Vec<u8>, TmxError> {
    let mut bytes = Vec::new();
    BmpEncoder::new(&mut bytes)
        .encode_with_palette(
            &image.indices,
            image.width,
            image.height,
            ExtendedColorType::L8,
            Some(image.palette.as_slice()),
        )
        .map_err(|error| TmxError::new("IMAGE_WRITE", error.to_string()))?;
    Ok(bytes)
}
