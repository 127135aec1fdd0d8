use crate::model::{EnumDecl, EnumKind, MapModel, ObjectRecord, ObjectRef};

use super::{
    multiline_array, span_table, span_table_rows, tile_table, tile_table_extents, INDENT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flavor {
    Butano,
    Hosted,
}

impl Flavor {
    fn size_type(self) -> &'static str {
        match self {
            Self::Butano => "bn::size",
            Self::Hosted => "bntmx::size",
        }
    }

    fn span_type(self) -> &'static str {
        match self {
            Self::Butano => "bn::span",
            Self::Hosted => "std::span",
        }
    }

    fn size_literal(self, width: u32, height: u32) -> String {
        match self {
            Self::Butano => format!("bn::size({}, {})", width, height),
            Self::Hosted => format!("bntmx::size{{{}, {}}}", width, height),
        }
    }

    fn object_literal(self, map_name: &str, object: &ObjectRecord) -> String {
        let id = match &object.id {
            ObjectRef::Index(index) => index.to_string(),
            ObjectRef::Named(name) => format!("{}::{}", map_name, name),
        };
        match self {
            Self::Butano => format!(
                "bntmx::map_object(bn::fixed_point({}, {}), {})",
                object.x, object.y, id
            ),
            Self::Hosted => format!("bntmx::map_object{{{}, {}, {}}}", object.x, object.y, id),
        }
    }

    /// A statement aborting when `variable` is outside `[0, bound)`.
    fn bounds_check(self, variable: &str, bound: usize, what: &str) -> String {
        let condition = format!("{} >= 0 && {} < {}", variable, variable, bound);
        match self {
            Self::Butano => format!("BN_ASSERT({}, \"Invalid {}: \", {});", condition, what, variable),
            Self::Hosted => format!("assert({} && \"Invalid {}\");", condition, what),
        }
    }
}

fn enum_block(decl: &EnumDecl, depth: usize) -> String {
    let indent = INDENT.repeat(depth);
    if decl.members.is_empty() {
        return format!("{}// {}\n", indent, decl.kind.empty_note());
    }
    let members = decl
        .members
        .iter()
        .map(|member| format!("{} = {}", member.name, member.value))
        .collect::<Vec<_>>();
    format!(
        "{}enum {}\n{}{};\n",
        indent,
        decl.kind.type_name(),
        indent,
        multiline_array(&members, depth)
    )
}

fn constexpr_accessor(return_type: &str, name: &str, value: &str) -> String {
    let indent = INDENT.repeat(3);
    format!(
        "{indent}constexpr {return_type} {name}() const\n{indent}{{\n{indent}{INDENT}return {value};\n{indent}}}\n\n",
    )
}

pub(super) fn render_header(model: &MapModel, flavor: Flavor) -> String {
    let name = &model.name;
    let guard = format!("BNTMX_MAPS_{}_H", name.to_uppercase());
    let dimensions = &model.dimensions;
    let size_type = flavor.size_type();
    let span_type = flavor.span_type();
    let member_indent = INDENT.repeat(3);

    let mut out = format!("#ifndef {guard}\n#define {guard}\n\n#include \"bntmx.h\"\n\n");
    if flavor == Flavor::Butano {
        out.push_str(&format!("#include <bn_regular_bg_items_{}.h>\n\n", name));
    }
    out.push_str(&format!(
        "namespace bntmx::maps\n{{\n{INDENT}class {name} : public bntmx::map\n{INDENT}{{\n{INDENT}{INDENT}public:\n"
    ));

    for kind in [EnumKind::ObjectClass, EnumKind::ObjectId, EnumKind::TileId] {
        out.push_str(&enum_block(model.enum_decl(kind), 3));
        out.push('\n');
    }

    for special in [format!("{}()", name), format!("~{}()", name)] {
        out.push_str(&format!(
            "{member_indent}constexpr {special}\n{member_indent}{{\n{member_indent}}}\n\n"
        ));
    }

    let accessors = [
        (
            size_type,
            "dimensions_in_pixels",
            flavor.size_literal(dimensions.width_in_pixels(), dimensions.height_in_pixels()),
        ),
        (
            size_type,
            "dimensions_in_tiles",
            flavor.size_literal(dimensions.width_in_tiles, dimensions.height_in_tiles),
        ),
        (
            size_type,
            "tile_dimensions",
            flavor.size_literal(dimensions.tile_width, dimensions.tile_height),
        ),
        ("int", "width_in_pixels", dimensions.width_in_pixels().to_string()),
        ("int", "height_in_pixels", dimensions.height_in_pixels().to_string()),
        ("int", "width_in_tiles", dimensions.width_in_tiles.to_string()),
        ("int", "height_in_tiles", dimensions.height_in_tiles.to_string()),
        ("int", "tile_width", dimensions.tile_width.to_string()),
        ("int", "tile_height", dimensions.tile_height.to_string()),
        ("int", "n_graphics_layers", model.n_graphics_layers.to_string()),
        ("int", "n_objects_layers", model.n_objects_layers.to_string()),
        ("int", "n_objects_classes", model.n_classes.to_string()),
        ("int", "n_objects", model.n_objects().to_string()),
        ("int", "n_tiles_layers", model.n_tiles_layers.to_string()),
    ];
    for (return_type, accessor, value) in &accessors {
        out.push_str(&constexpr_accessor(return_type, accessor, value));
    }
    if flavor == Flavor::Butano {
        out.push_str(&constexpr_accessor(
            "bn::regular_bg_item",
            "regular_bg_item",
            &format!("bn::regular_bg_items::{}", name),
        ));
    }

    out.push_str(&format!(
        "{member_indent}const bntmx::map_object object(int id) const;\n\
         {member_indent}const {span_type}<const bntmx::map_object> objects(int objects_layer_index) const;\n\
         {member_indent}const {span_type}<const bntmx::map_object> objects(int objects_layer_index, int objects_class) const;\n\
         {member_indent}const {span_type}<const bntmx::map_tile> tiles(int tiles_layer_index) const;\n"
    ));
    out.push_str(&format!("{INDENT}}};\n}}\n\n#endif\n"));
    out
}

pub(super) fn render_source(model: &MapModel, flavor: Flavor, header_file_name: &str) -> String {
    let name = &model.name;
    let span_type = flavor.span_type();
    let index_type = model.span_width.c_type();
    let n_rows = span_table_rows(model);
    let (n_tile_rows, n_tile_columns) = tile_table_extents(model);
    let body = INDENT.repeat(2);

    let objects = model
        .stored_objects()
        .iter()
        .map(|object| flavor.object_literal(name, object))
        .collect::<Vec<_>>();

    let mut out = format!("#include \"{header_file_name}\"\n\nnamespace bntmx::maps\n{{\n");
    out.push_str(&format!(
        "{INDENT}// Sorted by objects layer, then by class with classless objects first,\n\
         {INDENT}// then in discovery order, so object IDs are array positions.\n\
         {INDENT}static constexpr bntmx::map_object _objects[] = {};\n\n",
        multiline_array(&objects, 1)
    ));
    out.push_str(&format!(
        "{INDENT}static constexpr struct {{{index_type} index; {index_type} length;}} _objects_spans[{n_rows}][{}] = {};\n\n",
        model.n_classes,
        span_table(&model.stored_spans(), 1)
    ));
    out.push_str(&format!(
        "{INDENT}static const bntmx::map_tile _tiles[{n_tile_rows}][{n_tile_columns}] = {};\n\n",
        tile_table(model, 1)
    ));

    let object_span = |class: &str| {
        format!(
            "{span_type}<const bntmx::map_object>(&_objects[_objects_spans[objects_layer_index][{class}].index], _objects_spans[objects_layer_index][{class}].length)"
        )
    };
    let layer_check = flavor.bounds_check(
        "objects_layer_index",
        model.n_objects_layers,
        "objects layer index",
    );

    let functions = [
        (
            "const bntmx::map_object".to_string(),
            "object(int id)",
            vec![
                flavor.bounds_check("id", model.n_objects(), "object ID"),
                "return _objects[id];".to_string(),
            ],
        ),
        (
            format!("const {span_type}<const bntmx::map_object>"),
            "objects(int objects_layer_index)",
            vec![layer_check.clone(), format!("return {};", object_span("0"))],
        ),
        (
            format!("const {span_type}<const bntmx::map_object>"),
            "objects(int objects_layer_index, int objects_class)",
            vec![
                layer_check,
                flavor.bounds_check("objects_class", model.n_classes, "objects class"),
                format!("return {};", object_span("objects_class")),
            ],
        ),
        (
            format!("const {span_type}<const bntmx::map_tile>"),
            "tiles(int tiles_layer_index)",
            vec![
                flavor.bounds_check("tiles_layer_index", model.n_tiles_layers, "tiles layer index"),
                format!(
                    "return {span_type}<const bntmx::map_tile>(_tiles[tiles_layer_index], {});",
                    model.tiles_per_layer()
                ),
            ],
        ),
    ];

    let rendered = functions
        .iter()
        .map(|(return_type, signature, statements)| {
            let statements = statements
                .iter()
                .map(|statement| format!("{body}{statement}\n"))
                .collect::<String>();
            format!("{INDENT}{return_type} {name}::{signature} const\n{INDENT}{{\n{statements}{INDENT}}}\n")
        })
        .collect::<Vec<_>>();
    out.push_str(&rendered.join("\n"));
    out.push_str("}\n");
    out
}

pub(super) const BUTANO_SHARED_HEADER: &str = r#"#ifndef BNTMX_H
#define BNTMX_H

#include <cstdint>

#include <bn_fixed_point.h>
#include <bn_regular_bg_item.h>
#include <bn_size.h>
#include <bn_span.h>

namespace bntmx
{
    struct map_object
    {
        bn::fixed_point position;
        int id;
    };

    using map_tile = uint16_t;

    class map
    {
        public:
            virtual constexpr ~map() {}

            virtual constexpr bn::size dimensions_in_pixels() const = 0;
            virtual constexpr bn::size dimensions_in_tiles() const = 0;
            virtual constexpr bn::size tile_dimensions() const = 0;
            virtual constexpr int width_in_pixels() const = 0;
            virtual constexpr int height_in_pixels() const = 0;
            virtual constexpr int width_in_tiles() const = 0;
            virtual constexpr int height_in_tiles() const = 0;
            virtual constexpr int tile_width() const = 0;
            virtual constexpr int tile_height() const = 0;
            virtual constexpr int n_graphics_layers() const = 0;
            virtual constexpr int n_objects_layers() const = 0;
            virtual constexpr int n_objects_classes() const = 0;
            virtual constexpr int n_objects() const = 0;
            virtual constexpr int n_tiles_layers() const = 0;

            /// The background item holding every graphics layer of the map.
            virtual constexpr bn::regular_bg_item regular_bg_item() const = 0;

            /// The object with the given ID.
            virtual const bntmx::map_object object(int object_id) const = 0;

            /// The classless objects of the given objects layer.
            virtual const bn::span<const bntmx::map_object> objects(int objects_layer_index) const = 0;

            /// The objects of the given class in the given objects layer.
            virtual const bn::span<const bntmx::map_object> objects(int objects_layer_index, int objects_class) const = 0;

            /// The tiles of the given tiles layer, row by row.
            virtual const bn::span<const bntmx::map_tile> tiles(int tiles_layer_index) const = 0;
    };
}

#endif
"#;

pub(super) const CPP_SHARED_HEADER: &str = r#"#ifndef BNTMX_H
#define BNTMX_H

#include <cassert>
#include <cstdint>
#include <span>

namespace bntmx
{
    struct size
    {
        int width;
        int height;
    };

    struct map_object
    {
        int x;
        int y;
        int id;
    };

    using map_tile = uint16_t;

    class map
    {
        public:
            virtual constexpr ~map() {}

            virtual constexpr bntmx::size dimensions_in_pixels() const = 0;
            virtual constexpr bntmx::size dimensions_in_tiles() const = 0;
            virtual constexpr bntmx::size tile_dimensions() const = 0;
            virtual constexpr int width_in_pixels() const = 0;
            virtual constexpr int height_in_pixels() const = 0;
            virtual constexpr int width_in_tiles() const = 0;
            virtual constexpr int height_in_tiles() const = 0;
            virtual constexpr int tile_width() const = 0;
            virtual constexpr int tile_height() const = 0;
            virtual constexpr int n_graphics_layers() const = 0;
            virtual constexpr int n_objects_layers() const = 0;
            virtual constexpr int n_objects_classes() const = 0;
            virtual constexpr int n_objects() const = 0;
            virtual constexpr int n_tiles_layers() const = 0;

            /// The object with the given ID.
            virtual const bntmx::map_object object(int object_id) const = 0;

            /// The classless objects of the given objects layer.
            virtual const std::span<const bntmx::map_object> objects(int objects_layer_index) const = 0;

            /// The objects of the given class in the given objects layer.
            virtual const std::span<const bntmx::map_object> objects(int objects_layer_index, int objects_class) const = 0;

            /// The tiles of the given tiles layer, row by row.
            virtual const std::span<const bntmx::map_tile> tiles(int tiles_layer_index) const = 0;
    };
}

#endif
"#;
