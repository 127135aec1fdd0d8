use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::TmxError;

/// Tiled stores horizontal, vertical and diagonal flips in the top three
/// bits of every global tile ID.
pub const GID_FLAGS: u32 = 0xE000_0000;
pub const GID_MASK: u32 = !GID_FLAGS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerRole {
    Graphics,
    Objects,
    Tiles,
}

impl LayerRole {
    /// The map document element a layer of this role must resolve to.
    pub fn element_name(self) -> &'static str {
        match self {
            Self::Objects => "objectgroup",
            Self::Graphics | Self::Tiles => "layer",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Graphics => "graphics",
            Self::Objects => "objects",
            Self::Tiles => "tiles",
        }
    }
}

/// A `/`-joined sequence of group names ending with a leaf layer name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayerPath {
    segments: Vec<String>,
}

impl LayerPath {
    pub fn parse(raw: &str) -> Result<Self, TmxError> {
        let segments = raw.split('/').map(str::to_string).collect::<Vec<_>>();
        if segments.iter().any(String::is_empty) {
            return Err(TmxError::new(
                "LAYER_PATH_INVALID",
                format!("Layer path \"{}\" contains an empty segment.", raw),
            ));
        }
        Ok(Self { segments })
    }

    pub fn groups(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    pub fn leaf(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }
}

impl fmt::Display for LayerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapDimensions {
    pub width_in_tiles: u32,
    pub height_in_tiles: u32,
    pub tile_width: u32,
    pub tile_height: u32,
}

impl MapDimensions {
    pub fn width_in_pixels(&self) -> u32 {
        self.width_in_tiles * self.tile_width
    }

    pub fn height_in_pixels(&self) -> u32 {
        self.height_in_tiles * self.tile_height
    }

    /// Pixel width and height, or `None` when either does not fit a C `int`.
    pub fn checked_pixel_size(&self) -> Option<(u32, u32)> {
        let pixels = |tiles: u32, tile: u32| {
            tiles
                .checked_mul(tile)
                .filter(|&pixels| pixels <= i32::MAX as u32)
        };
        Some((
            pixels(self.width_in_tiles, self.tile_width)?,
            pixels(self.height_in_tiles, self.tile_height)?,
        ))
    }

    pub fn tile_count(&self) -> usize {
        self.width_in_tiles as usize * self.height_in_tiles as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// Parses Tiled's `#RRGGBB` or `#AARRGGBB` colour notation.
    pub fn parse_hex(raw: &str) -> Result<Self, TmxError> {
        let invalid = || {
            TmxError::new(
                "COLOR_INVALID",
                format!("Unsupported colour \"{}\", expected #RRGGBB or #AARRGGBB.", raw),
            )
        };
        let digits = raw.trim().trim_start_matches('#');
        if !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let byte = |index: usize| {
            u8::from_str_radix(&digits[index * 2..index * 2 + 2], 16).map_err(|_| invalid())
        };
        match digits.len() {
            6 => Ok(Self {
                r: byte(0)?,
                g: byte(1)?,
                b: byte(2)?,
                a: 0xFF,
            }),
            8 => Ok(Self {
                a: byte(0)?,
                r: byte(1)?,
                g: byte(2)?,
                b: byte(3)?,
            }),
            _ => Err(invalid()),
        }
    }
}

/// A contiguous range of global tile IDs bound to one external tileset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilesetBinding {
    pub name: String,
    pub first_gid: u32,
    pub last_gid: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub columns: u32,
    pub source: PathBuf,
    pub image: PathBuf,
}

impl TilesetBinding {
    pub fn contains(&self, gid: u32) -> bool {
        gid >= self.first_gid && gid <= self.last_gid
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapObject {
    pub x: i32,
    pub y: i32,
    /// Stable identifier; `None` for anonymous objects.
    pub name: Option<String>,
    pub class: String,
}

impl MapObject {
    /// Builds an object centred on a source rectangle. Object rectangles are
    /// anchored at their bottom-left corner while the map origin is top-left,
    /// so half the height is subtracted rather than added.
    pub fn from_rect(
        rect_x: i32,
        rect_y: i32,
        rect_width: i32,
        rect_height: i32,
        name: Option<String>,
        class: impl Into<String>,
    ) -> Self {
        Self {
            x: rect_x + rect_width / 2,
            y: rect_y - rect_height / 2,
            name,
            class: class.into(),
        }
    }
}

/// Objects of one output objects layer grouped by class label, in discovery
/// order within each class. The classless bucket always exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLayer {
    by_class: BTreeMap<String, Vec<MapObject>>,
}

impl Default for ObjectLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectLayer {
    pub fn new() -> Self {
        Self {
            by_class: BTreeMap::from([(String::new(), Vec::new())]),
        }
    }

    pub fn push(&mut self, object: MapObject) {
        self.by_class
            .entry(object.class.clone())
            .or_default()
            .push(object);
    }

    pub fn class_labels(&self) -> impl Iterator<Item = &str> {
        self.by_class.keys().map(String::as_str)
    }

    pub fn objects_of(&self, class: &str) -> &[MapObject] {
        self.by_class.get(class).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_class.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod types_tests {
    use super::*;

    #[test]
    fn layer_path_splits_groups_and_leaf() {
        let path = LayerPath::parse("world/front/collisions").expect("path should parse");
        assert_eq!(path.groups(), ["world".to_string(), "front".to_string()]);
        assert_eq!(path.leaf(), "collisions");
        assert_eq!(path.to_string(), "world/front/collisions");

        let single = LayerPath::parse("objects").expect("single segment");
        assert!(single.groups().is_empty());
        assert_eq!(single.leaf(), "objects");
    }

    #[test]
    fn layer_path_rejects_empty_segments() {
        for raw in ["", "a//b", "/a", "a/"] {
            let error = LayerPath::parse(raw).expect_err("empty segment should fail");
            assert_eq!(error.code, "LAYER_PATH_INVALID");
        }
    }

    #[test]
    fn layer_role_maps_to_document_elements() {
        assert_eq!(LayerRole::Objects.element_name(), "objectgroup");
        assert_eq!(LayerRole::Tiles.element_name(), "layer");
        assert_eq!(LayerRole::Graphics.element_name(), "layer");
    }

    #[test]
    fn checked_pixel_size_stays_within_c_int() {
        let dimensions = MapDimensions {
            width_in_tiles: 3,
            height_in_tiles: 2,
            tile_width: 8,
            tile_height: 16,
        };
        assert_eq!(dimensions.checked_pixel_size(), Some((24, 32)));

        let wrapping = MapDimensions {
            width_in_tiles: 70_000,
            tile_width: 65_536,
            ..dimensions
        };
        assert_eq!(wrapping.checked_pixel_size(), None);

        let above_int = MapDimensions {
            height_in_tiles: 1 << 28,
            ..dimensions
        };
        assert_eq!(above_int.checked_pixel_size(), None);
    }

    #[test]
    fn map_object_anchor_transform_truncates() {
        let object = MapObject::from_rect(10, 40, 15, 7, None, "");
        assert_eq!((object.x, object.y), (17, 37));

        let point = MapObject::from_rect(3, 4, 0, 0, Some("spawn".to_string()), "enemy");
        assert_eq!((point.x, point.y), (3, 4));
        assert_eq!(point.class, "enemy");
    }

    #[test]
    fn object_layer_always_has_classless_bucket() {
        let mut layer = ObjectLayer::new();
        assert_eq!(layer.class_labels().collect::<Vec<_>>(), vec![""]);
        assert!(layer.is_empty());

        layer.push(MapObject::from_rect(0, 0, 0, 0, None, "enemy"));
        layer.push(MapObject::from_rect(1, 0, 0, 0, None, ""));
        layer.push(MapObject::from_rect(2, 0, 0, 0, None, "enemy"));
        assert_eq!(layer.class_labels().collect::<Vec<_>>(), vec!["", "enemy"]);
        assert_eq!(layer.len(), 3);
        let xs = layer
            .objects_of("enemy")
            .iter()
            .map(|object| object.x)
            .collect::<Vec<_>>();
        assert_eq!(xs, vec![0, 2]);
        assert!(layer.objects_of("missing").is_empty());
    }

    #[test]
    fn dimensions_derive_pixel_sizes() {
        let dimensions = MapDimensions {
            width_in_tiles: 30,
            height_in_tiles: 20,
            tile_width: 16,
            tile_height: 8,
        };
        assert_eq!(dimensions.width_in_pixels(), 480);
        assert_eq!(dimensions.height_in_pixels(), 160);
        assert_eq!(dimensions.tile_count(), 600);
    }

    #[test]
    fn rgba_parses_both_hex_notations() {
        assert_eq!(
            Rgba::parse_hex("#102030").expect("rgb"),
            Rgba {
                r: 0x10,
                g: 0x20,
                b: 0x30,
                a: 0xFF
            }
        );
        assert_eq!(
            Rgba::parse_hex("#80102030").expect("argb"),
            Rgba {
                r: 0x10,
                g: 0x20,
                b: 0x30,
                a: 0x80
            }
        );
        assert_eq!(
            Rgba::parse_hex("#12345").expect_err("short").code,
            "COLOR_INVALID"
        );
        assert_eq!(
            Rgba::parse_hex("#zz2030").expect_err("non hex").code,
            "COLOR_INVALID"
        );
    }

    #[test]
    fn gid_mask_strips_flip_flags() {
        assert_eq!(0x8000_0005 & GID_MASK, 5);
        assert_eq!(0x2000_0011 & GID_MASK, 0x11);
    }

    #[test]
    fn tileset_binding_contains_is_inclusive() {
        let binding = TilesetBinding {
            name: "terrain".to_string(),
            first_gid: 1,
            last_gid: 4,
            tile_width: 8,
            tile_height: 8,
            columns: 2,
            source: PathBuf::from("terrain.tsx"),
            image: PathBuf::from("terrain.png"),
        };
        assert!(binding.contains(1));
        assert!(binding.contains(4));
        assert!(!binding.contains(0));
        assert!(!binding.contains(5));
    }
}
