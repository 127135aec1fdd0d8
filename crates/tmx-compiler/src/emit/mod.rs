mod c;
mod cpp;

use std::fmt::Display;

use tmx_core::TmxError;

use crate::flatten::ObjectSpan;
use crate::model::MapModel;

const INDENT: &str = "    ";

/// Output syntax of the generated sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// C++ classes for the Butano engine.
    Butano,
    /// The same classes for a hosted C++20 toolchain.
    Cpp,
    C,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::Butano, Dialect::Cpp, Dialect::C];

    pub fn name(self) -> &'static str {
        match self {
            Self::Butano => "butano",
            Self::Cpp => "cpp",
            Self::C => "c",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, TmxError> {
        Self::ALL
            .into_iter()
            .find(|dialect| dialect.name() == raw)
            .ok_or_else(|| {
                TmxError::new(
                    "TARGET_UNKNOWN",
                    format!("Unknown target \"{}\", expected butano, cpp or c.", raw),
                )
            })
    }

    pub fn source_extension(self) -> &'static str {
        match self {
            Self::Butano | Self::Cpp => "cpp",
            Self::C => "c",
        }
    }

    /// First line of every per-map header rendered for this dialect.
    pub fn header_banner(self) -> String {
        format!("/* bntmx target: {} */\n", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSources {
    pub header_file_name: String,
    pub header: String,
    pub source_file_name: String,
    pub source: String,
}

pub fn header_file_name(map_name: &str) -> String {
    format!("bntmx_maps_{}.h", map_name)
}

pub fn source_file_name(map_name: &str, dialect: Dialect) -> String {
    format!("bntmx_maps_{}.{}", map_name, dialect.source_extension())
}

pub const SHARED_HEADER_FILE_NAME: &str = "bntmx.h";

/// The record layouts and base interface every generated map relies on.
pub fn shared_header(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Butano => cpp::BUTANO_SHARED_HEADER,
        Dialect::Cpp => cpp::CPP_SHARED_HEADER,
        Dialect::C => c::SHARED_HEADER,
    }
}

pub fn render_sources(model: &MapModel, dialect: Dialect) -> RenderedSources {
    let header_file_name = header_file_name(&model.name);
    let (body, source) = match dialect {
        Dialect::Butano => (
            cpp::render_header(model, cpp::Flavor::Butano),
            cpp::render_source(model, cpp::Flavor::Butano, &header_file_name),
        ),
        Dialect::Cpp => (
            cpp::render_header(model, cpp::Flavor::Hosted),
            cpp::render_source(model, cpp::Flavor::Hosted, &header_file_name),
        ),
        Dialect::C => (
            c::render_header(model),
            c::render_source(model, &header_file_name),
        ),
    };
    RenderedSources {
        source_file_name: source_file_name(&model.name, dialect),
        header_file_name,
        header: dialect.header_banner() + &body,
        source,
    }
}

pub(crate) fn inline_array<T: Display>(items: &[T]) -> String {
    let items = items.iter().map(ToString::to_string).collect::<Vec<_>>();
    format!("{{{}}}", items.join(","))
}

/// One item per line, `depth` levels deep.
pub(crate) fn multiline_array(items: &[String], depth: usize) -> String {
    let outer = INDENT.repeat(depth);
    let inner = INDENT.repeat(depth + 1);
    format!(
        "{{\n{}{}\n{}}}",
        inner,
        items.join(&format!(",\n{}", inner)),
        outer
    )
}

pub(crate) fn span_table(spans: &[Vec<ObjectSpan>], depth: usize) -> String {
    let rows = spans
        .iter()
        .map(|row| {
            let cells = row
                .iter()
                .map(|span| inline_array(&[span.index, span.length]))
                .collect::<Vec<_>>();
            multiline_array(&cells, depth + 1)
        })
        .collect::<Vec<_>>();
    multiline_array(&rows, depth)
}

/// Tile layers with one source line per map row.
pub(crate) fn tile_table(model: &MapModel, depth: usize) -> String {
    let width = model.dimensions.width_in_tiles.max(1) as usize;
    let layers = model
        .stored_tiles()
        .iter()
        .map(|tiles| {
            let rows = tiles
                .chunks(width)
                .map(|row| {
                    row.iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(",")
                })
                .collect::<Vec<_>>();
            multiline_array(&rows, depth + 1)
        })
        .collect::<Vec<_>>();
    multiline_array(&layers, depth)
}

/// Array extents of the stored tile table.
pub(crate) fn tile_table_extents(model: &MapModel) -> (usize, usize) {
    if model.tiles.is_empty() {
        (1, 1)
    } else {
        (model.n_tiles_layers, model.tiles_per_layer())
    }
}

pub(crate) fn span_table_rows(model: &MapModel) -> usize {
    model.n_objects_layers.max(1)
}

#[cfg(test)]
mod emit_tests {
    use super::*;
    use crate::compiler_test_support::*;
    use crate::model::build_map_model;

    #[test]
    fn dialect_names_round_trip_through_parse() {
        for dialect in Dialect::ALL {
            assert_eq!(Dialect::parse(dialect.name()).expect("known"), dialect);
        }
        assert_eq!(
            Dialect::parse("rust").expect_err("unknown").code,
            "TARGET_UNKNOWN"
        );
        assert_eq!(Dialect::C.source_extension(), "c");
        assert_eq!(source_file_name("level", Dialect::Cpp), "bntmx_maps_level.cpp");
        assert_eq!(Dialect::Butano.header_banner(), "/* bntmx target: butano */\n");
    }

    #[test]
    fn array_helpers_format_literals() {
        assert_eq!(inline_array(&[1, 2, 3]), "{1,2,3}");
        assert_eq!(
            multiline_array(&["a".to_string(), "b".to_string()], 1),
            "{\n        a,\n        b\n    }"
        );
    }

    #[test]
    fn tile_table_keeps_map_rows_on_their_own_lines() {
        let model = build_map_model(&sample_map()).expect("model");
        assert_eq!(
            tile_table(&model, 1),
            "{\n        {\n            0,5,2,\n            0,0,2\n        }\n    }"
        );
        assert_eq!(tile_table_extents(&model), (1, 6));
    }

    #[test]
    fn span_table_nests_layers_and_classes() {
        let model = build_map_model(&sample_map()).expect("model");
        let table = span_table(&model.spans, 1);
        assert_eq!(
            table,
            "{\n        {\n            {0,1},\n            {0,0}\n        },\n        {\n            {1,1},\n            {2,1}\n        }\n    }"
        );
    }

    #[test]
    fn rendering_is_deterministic_for_every_dialect() {
        let model = build_map_model(&sample_map()).expect("model");
        for dialect in Dialect::ALL {
            let first = render_sources(&model, dialect);
            let second = render_sources(&build_map_model(&sample_map()).expect("model"), dialect);
            assert_eq!(first, second);
            assert_eq!(first.header_file_name, "bntmx_maps_level.h");
            assert!(!shared_header(dialect).is_empty());
            assert!(first.header.starts_with(&dialect.header_banner()));
        }
    }
}
