use crate::model::{EnumDecl, EnumKind, MapModel, ObjectRef};

use super::{
    multiline_array, span_table, span_table_rows, tile_table, tile_table_extents, INDENT,
};

/// C enumerators share one global namespace, hence the map prefix.
fn member_prefix(map_name: &str) -> String {
    format!("BNTMX_MAPS_{}_", map_name.to_uppercase())
}

fn enum_block(decl: &EnumDecl, map_name: &str) -> String {
    if decl.members.is_empty() {
        return format!("/* {} */\n", decl.kind.empty_note());
    }
    let prefix = member_prefix(map_name);
    let members = decl
        .members
        .iter()
        .map(|member| format!("{}{} = {}", prefix, member.name, member.value))
        .collect::<Vec<_>>();
    format!(
        "typedef enum\n{} bntmx_maps_{}_{};\n",
        multiline_array(&members, 0),
        map_name,
        decl.kind.type_name()
    )
}

fn bounds_check(variable: &str, bound: usize, what: &str) -> String {
    format!(
        "assert({} >= 0 && {} < {} && \"Invalid {}\");",
        variable, variable, bound, what
    )
}

pub(super) fn render_header(model: &MapModel) -> String {
    let name = &model.name;
    let guard = format!("BNTMX_MAPS_{}_H", name.to_uppercase());
    let dimensions = &model.dimensions;

    let mut out = format!("#ifndef {guard}\n#define {guard}\n\n#include \"bntmx.h\"\n\n");
    for kind in [EnumKind::ObjectClass, EnumKind::ObjectId, EnumKind::TileId] {
        out.push_str(&enum_block(model.enum_decl(kind), name));
        out.push('\n');
    }

    let constants = [
        ("width_in_pixels", dimensions.width_in_pixels() as usize),
        ("height_in_pixels", dimensions.height_in_pixels() as usize),
        ("width_in_tiles", dimensions.width_in_tiles as usize),
        ("height_in_tiles", dimensions.height_in_tiles as usize),
        ("tile_width", dimensions.tile_width as usize),
        ("tile_height", dimensions.tile_height as usize),
        ("n_graphics_layers", model.n_graphics_layers),
        ("n_objects_layers", model.n_objects_layers),
        ("n_objects_classes", model.n_classes),
        ("n_objects", model.n_objects()),
        ("n_tiles_layers", model.n_tiles_layers),
    ];
    for (accessor, value) in constants {
        out.push_str(&format!("#define bntmx_maps_{name}_{accessor}() ({value})\n"));
    }

    out.push_str(&format!(
        "\nbntmx_map_object bntmx_maps_{name}_object(int id);\n\
         bntmx_span bntmx_maps_{name}_objects(int objects_layer_index, int objects_class);\n\
         bntmx_span bntmx_maps_{name}_tiles(int tiles_layer_index);\n\n#endif\n"
    ));
    out
}

pub(super) fn render_source(model: &MapModel, header_file_name: &str) -> String {
    let name = &model.name;
    let prefix = member_prefix(name);
    let index_type = model.span_width.c_type();
    let n_rows = span_table_rows(model);
    let (n_tile_rows, n_tile_columns) = tile_table_extents(model);

    let objects = model
        .stored_objects()
        .iter()
        .map(|object| {
            let id = match &object.id {
                ObjectRef::Index(index) => index.to_string(),
                ObjectRef::Named(member) => format!("{}{}", prefix, member),
            };
            format!("{{{}, {}, {}}}", object.x, object.y, id)
        })
        .collect::<Vec<_>>();

    let mut out = format!("#include \"{header_file_name}\"\n\n");
    out.push_str(&format!(
        "/* Sorted by objects layer, then by class with classless objects first, then\n \
         * in discovery order, so object IDs are array positions.\n \
         */\nstatic const bntmx_map_object _objects[] = {};\n\n",
        multiline_array(&objects, 0)
    ));
    out.push_str(&format!(
        "static const struct {{{index_type} index; {index_type} length;}} _objects_spans[{n_rows}][{}] = {};\n\n",
        model.n_classes,
        span_table(&model.stored_spans(), 0)
    ));
    out.push_str(&format!(
        "static const bntmx_map_tile _tiles[{n_tile_rows}][{n_tile_columns}] = {};\n\n",
        tile_table(model, 0)
    ));

    let span = "_objects_spans[objects_layer_index][objects_class]";
    let functions = [
        (
            format!("bntmx_map_object bntmx_maps_{name}_object(int id)"),
            vec![
                bounds_check("id", model.n_objects(), "object ID"),
                "return _objects[id];".to_string(),
            ],
        ),
        (
            format!(
                "bntmx_span bntmx_maps_{name}_objects(int objects_layer_index, int objects_class)"
            ),
            vec![
                bounds_check(
                    "objects_layer_index",
                    model.n_objects_layers,
                    "objects layer index",
                ),
                bounds_check("objects_class", model.n_classes, "objects class"),
                format!("bntmx_span span = {{&_objects[{span}.index], {span}.length}};"),
                "return span;".to_string(),
            ],
        ),
        (
            format!("bntmx_span bntmx_maps_{name}_tiles(int tiles_layer_index)"),
            vec![
                bounds_check("tiles_layer_index", model.n_tiles_layers, "tiles layer index"),
                format!(
                    "bntmx_span span = {{_tiles[tiles_layer_index], {}}};",
                    model.tiles_per_layer()
                ),
                "return span;".to_string(),
            ],
        ),
    ];

    let rendered = functions
        .iter()
        .map(|(signature, statements)| {
            let statements = statements
                .iter()
                .map(|statement| format!("{INDENT}{statement}\n"))
                .collect::<String>();
            format!("{signature}\n{{\n{statements}}}\n")
        })
        .collect::<Vec<_>>();
    out.push_str(&rendered.join("\n"));
    out
}

pub(super) const SHARED_HEADER: &str = r#"#ifndef BNTMX_H
#define BNTMX_H

#include <assert.h>
#include <stddef.h>
#include <stdint.h>

typedef struct
{
    int x;
    int y;
    uint16_t id;
} bntmx_map_object;

typedef uint16_t bntmx_map_tile;

typedef struct
{
    const void* data;
    size_t length;
} bntmx_span;

#endif
"#;
