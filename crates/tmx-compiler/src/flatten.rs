use std::collections::BTreeSet;

use tmx_core::{sanitize_identifier, ObjectLayer, TilesetBinding, TmxError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatObject {
    /// Position in the flat object array, also the object's public ID.
    pub index: usize,
    pub layer: usize,
    /// Rank of the object's class in the sorted class list.
    pub class: usize,
    pub x: i32,
    pub y: i32,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectSpan {
    pub index: usize,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatObjects {
    /// Every class label of the map, sorted, the classless label first.
    pub classes: Vec<String>,
    pub objects: Vec<FlatObject>,
    /// One row per objects layer, one column per class.
    pub spans: Vec<Vec<ObjectSpan>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IndexWidth {
    U8,
    U16,
    U32,
}

impl IndexWidth {
    /// The narrowest width able to hold every index and length up to `count`.
    pub fn for_count(count: usize) -> Self {
        if count <= u8::MAX as usize {
            Self::U8
        } else if count <= u16::MAX as usize {
            Self::U16
        } else {
            Self::U32
        }
    }

    pub fn c_type(self) -> &'static str {
        match self {
            Self::U8 => "uint8_t",
            Self::U16 => "uint16_t",
            Self::U32 => "uint32_t",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    pub value: u64,
}

impl EnumMember {
    pub fn new(name: impl Into<String>, value: impl Into<u64>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

pub fn object_classes(layers: &[ObjectLayer]) -> Vec<String> {
    let mut classes = BTreeSet::from([String::new()]);
    for layer in layers {
        classes.extend(layer.class_labels().map(str::to_string));
    }
    classes.into_iter().collect()
}

/// Flattens objects layers into one array ordered by layer, then class rank,
/// then discovery order. Indices restart at zero on every call. Empty
/// (layer, class) buckets get the span `(0, 0)`.
pub fn flatten_objects(layers: &[ObjectLayer]) -> FlatObjects {
    let classes = object_classes(layers);
    let mut objects = Vec::new();
    let mut spans = Vec::with_capacity(layers.len());

    for (layer_index, layer) in layers.iter().enumerate() {
        let mut row = Vec::with_capacity(classes.len());
        for (rank, class) in classes.iter().enumerate() {
            let bucket = layer.objects_of(class);
            if bucket.is_empty() {
                row.push(ObjectSpan::default());
                continue;
            }
            row.push(ObjectSpan {
                index: objects.len(),
                length: bucket.len(),
            });
            for object in bucket {
                objects.push(FlatObject {
                    index: objects.len(),
                    layer: layer_index,
                    class: rank,
                    x: object.x,
                    y: object.y,
                    name: object.name.clone(),
                });
            }
        }
        spans.push(row);
    }

    FlatObjects {
        classes,
        objects,
        spans,
    }
}

impl FlatObjects {
    pub fn index_width(&self) -> IndexWidth {
        IndexWidth::for_count(self.objects.len())
    }

    /// Members for every named class; the classless rank 0 is left out.
    pub fn class_members(&self) -> Result<Vec<EnumMember>, TmxError> {
        let mut members: Vec<EnumMember> = Vec::new();
        for (rank, class) in self.classes.iter().enumerate().skip(1) {
            let name = sanitize_identifier(class);
            if let Some(clash) = members.iter().find(|member| member.name == name) {
                let previous = &self.classes[clash.value as usize];
                return Err(TmxError::new(
                    "CLASS_NAME_COLLISION",
                    format!(
                        "Object classes \"{}\" and \"{}\" both map to identifier \"{}\".",
                        previous, class, name
                    ),
                ));
            }
            members.push(EnumMember::new(name, rank as u64));
        }
        Ok(members)
    }

    /// Members for every named object, valued by flat index.
    pub fn object_id_members(&self) -> Vec<EnumMember> {
        self.objects
            .iter()
            .filter_map(|object| {
                let name = object.name.as_ref()?;
                Some(EnumMember::new(name.clone(), object.index as u64))
            })
            .collect()
    }
}

/// A `NAME = first` and `NAME_LAST = last` pair per tileset, named after the
/// tileset file stem.
pub fn tileset_members(tilesets: &[TilesetBinding]) -> Result<Vec<EnumMember>, TmxError> {
    let mut members: Vec<EnumMember> = Vec::with_capacity(tilesets.len() * 2);
    for tileset in tilesets {
        let base = sanitize_identifier(&tileset.name.to_uppercase());
        let pair = [
            EnumMember::new(base.clone(), tileset.first_gid),
            EnumMember::new(format!("{}_LAST", base), tileset.last_gid),
        ];
        for member in pair {
            if members.iter().any(|existing| existing.name == member.name) {
                return Err(TmxError::new(
                    "TILESET_NAME_COLLISION",
                    format!(
                        "Tileset \"{}\" maps to tile ID \"{}\" which is already taken.",
                        tileset.source.display(),
                        member.name
                    ),
                ));
            }
            members.push(member);
        }
    }
    Ok(members)
}
