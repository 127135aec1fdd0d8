use std::collections::BTreeMap;

use tmx_core::{is_reserved_word, MapDimensions, TmxError};
use tmx_parser::LoadedMap;

use crate::flatten::{flatten_objects, tileset_members, EnumMember, IndexWidth, ObjectSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumKind {
    ObjectClass,
    ObjectId,
    TileId,
}

impl EnumKind {
    pub fn type_name(self) -> &'static str {
        match self {
            Self::ObjectClass => "object_class",
            Self::ObjectId => "object_id",
            Self::TileId => "tile_id",
        }
    }

    /// Printed in place of an enumeration with no members.
    pub fn empty_note(self) -> &'static str {
        match self {
            Self::ObjectClass => "This map has no object classes.",
            Self::ObjectId => "This map has no named objects.",
            Self::TileId => "This map has no tilesets.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    pub kind: EnumKind,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectRef {
    Index(usize),
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub x: i32,
    pub y: i32,
    pub id: ObjectRef,
}

/// Typed declarations of one generated map, independent of the output
/// dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapModel {
    pub name: String,
    pub dimensions: MapDimensions,
    pub n_graphics_layers: usize,
    pub n_objects_layers: usize,
    pub n_tiles_layers: usize,
    pub n_classes: usize,
    pub enums: [EnumDecl; 3],
    pub objects: Vec<ObjectRecord>,
    pub spans: Vec<Vec<ObjectSpan>>,
    pub span_width: IndexWidth,
    pub tiles: Vec<Vec<u32>>,
}

pub fn build_map_model(map: &LoadedMap) -> Result<MapModel, TmxError> {
    let flat = flatten_objects(&map.object_layers);
    let enums = [
        EnumDecl {
            kind: EnumKind::ObjectClass,
            members: flat.class_members()?,
        },
        EnumDecl {
            kind: EnumKind::ObjectId,
            members: flat.object_id_members(),
        },
        EnumDecl {
            kind: EnumKind::TileId,
            members: tileset_members(&map.tilesets)?,
        },
    ];
    check_member_collisions(&enums, &map.name)?;

    let objects = flat
        .objects
        .iter()
        .map(|object| ObjectRecord {
            x: object.x,
            y: object.y,
            id: match &object.name {
                Some(name) => ObjectRef::Named(name.clone()),
                None => ObjectRef::Index(object.index),
            },
        })
        .collect();

    tracing::debug!(
        map = %map.name,
        objects = flat.objects.len(),
        classes = flat.classes.len(),
        "flattened objects"
    );

    Ok(MapModel {
        name: map.name.clone(),
        dimensions: map.dimensions,
        n_graphics_layers: map.graphics_layers.len(),
        n_objects_layers: map.object_layers.len(),
        n_tiles_layers: map.tile_layers.len(),
        n_classes: flat.classes.len(),
        span_width: flat.index_width(),
        enums,
        objects,
        spans: flat.spans,
        tiles: map.tile_layers.clone(),
    })
}

/// Names the generated C++ class declares next to its enumerations.
const CLASS_SCOPE_NAMES: &[&str] = &[
    "object_class",
    "object_id",
    "tile_id",
    "dimensions_in_pixels",
    "dimensions_in_tiles",
    "tile_dimensions",
    "width_in_pixels",
    "height_in_pixels",
    "width_in_tiles",
    "height_in_tiles",
    "tile_width",
    "tile_height",
    "n_graphics_layers",
    "n_objects_layers",
    "n_objects_classes",
    "n_objects",
    "n_tiles_layers",
    "regular_bg_item",
    "object",
    "objects",
    "tiles",
];

/// The three enumerations share one scope in every dialect, and in C++ that
/// scope also holds the class's own members.
fn check_member_collisions(enums: &[EnumDecl], map_name: &str) -> Result<(), TmxError> {
    let mut seen: BTreeMap<&str, EnumKind> = BTreeMap::new();
    for decl in enums {
        for member in &decl.members {
            let name = member.name.as_str();
            if name == map_name || CLASS_SCOPE_NAMES.contains(&name) || is_reserved_word(name) {
                return Err(TmxError::new(
                    "ENUM_MEMBER_RESERVED",
                    format!(
                        "\"{}\" in {} clashes with a name the generated map declares.",
                        name,
                        decl.kind.type_name()
                    ),
                ));
            }
            if let Some(previous) = seen.insert(member.name.as_str(), decl.kind) {
                return Err(TmxError::new(
                    "ENUM_MEMBER_COLLISION",
                    format!(
                        "\"{}\" is declared both in {} and in {}.",
                        member.name,
                        previous.type_name(),
                        decl.kind.type_name()
                    ),
                ));
            }
        }
    }
    Ok(())
}

impl MapModel {
    pub fn n_objects(&self) -> usize {
        self.objects.len()
    }

    pub fn tiles_per_layer(&self) -> usize {
        self.dimensions.tile_count()
    }

    pub fn enum_decl(&self, kind: EnumKind) -> &EnumDecl {
        match kind {
            EnumKind::ObjectClass => &self.enums[0],
            EnumKind::ObjectId => &self.enums[1],
            EnumKind::TileId => &self.enums[2],
        }
    }

    /// The physical object array: fixed-size arrays cannot be empty, so a map
    /// without objects stores one placeholder no accessor can reach.
    pub fn stored_objects(&self) -> Vec<ObjectRecord> {
        if self.objects.is_empty() {
            return vec![ObjectRecord {
                x: 0,
                y: 0,
                id: ObjectRef::Index(0),
            }];
        }
        self.objects.clone()
    }

    pub fn stored_spans(&self) -> Vec<Vec<ObjectSpan>> {
        if self.spans.is_empty() {
            return vec![vec![ObjectSpan::default(); self.n_classes]];
        }
        self.spans.clone()
    }

    pub fn stored_tiles(&self) -> Vec<Vec<u32>> {
        if self.tiles.is_empty() {
            return vec![vec![0]];
        }
        self.tiles.clone()
    }
}

#[cfg(test)]
mod model_tests {
    use super::*;
    use crate::compiler_test_support::*;

    #[test]
    fn build_map_model_references_named_objects_by_enum() {
        let model = build_map_model(&sample_map()).expect("model should build");
        assert_eq!(model.name, "level");
        assert_eq!(model.n_objects(), 3);
        assert_eq!(model.n_objects_layers, 2);
        assert_eq!(model.n_classes, 2);
        assert_eq!(
            model.objects.iter().map(|object| object.id.clone()).collect::<Vec<_>>(),
            vec![
                ObjectRef::Named("door".to_string()),
                ObjectRef::Index(1),
                ObjectRef::Named("boss".to_string()),
            ]
        );
        let ids = model.enum_decl(EnumKind::ObjectId);
        assert_eq!(ids.members.len(), 2);
        assert_eq!(ids.members[1], EnumMember::new("boss", 2u64));
        assert_eq!(model.enum_decl(EnumKind::TileId).members.len(), 2);
        assert_eq!(model.tiles_per_layer(), 6);
        assert_eq!(model.span_width, IndexWidth::U8);
    }

    #[test]
    fn empty_maps_store_placeholders_but_declare_zero() {
        let mut map = sample_map();
        map.object_layers.clear();
        map.tile_layers.clear();
        map.tilesets.clear();
        let model = build_map_model(&map).expect("model should build");

        assert_eq!(model.n_objects(), 0);
        assert_eq!(model.n_objects_layers, 0);
        assert_eq!(model.n_tiles_layers, 0);
        assert_eq!(model.stored_objects().len(), 1);
        assert_eq!(model.stored_spans(), vec![vec![ObjectSpan::default()]]);
        assert_eq!(model.stored_tiles(), vec![vec![0]]);
        assert!(model
            .enums
            .iter()
            .all(|decl| decl.members.is_empty()));
    }

    #[test]
    fn names_shared_between_enumerations_are_rejected() {
        let mut map = sample_map();
        map.object_layers = vec![object_layer(&[("enemy", ""), ("", "enemy")])];
        let error = build_map_model(&map).expect_err("collision");
        assert_eq!(error.code, "ENUM_MEMBER_COLLISION");
    }

    #[test]
    fn names_declared_by_the_map_class_are_rejected() {
        for (name, class) in [("tiles", ""), ("n_objects", ""), ("level", ""), ("", "int")] {
            let mut map = sample_map();
            map.object_layers = vec![object_layer(&[(name, class)])];
            let error = build_map_model(&map).expect_err("reserved member");
            assert_eq!(error.code, "ENUM_MEMBER_RESERVED", "{name}{class}");
        }
    }
}
