mod layers;
mod map;
mod tiles;
mod tileset;
mod xml;

pub use layers::{read_objects, resolve_layer};
pub use map::{
    descriptor_path, map_name, parse_map_document, read_descriptor, read_map,
    read_map_document, LoadedMap, MapDocument,
};
pub use tiles::{merge_tile_layers, read_tiles};
pub use tileset::{parse_tileset_document, read_tileset};
pub use xml::{parse_xml, XmlElement};

#[cfg(test)]
pub(crate) mod parser_test_support {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    pub(crate) fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!("tmx-parser-{}-{}", name, nanos))
    }

    pub(crate) fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent should be created");
        }
        fs::write(path, content).expect("file should be written");
    }

    pub(crate) fn root(source: &str) -> crate::XmlElement {
        crate::parse_xml(source).expect("xml should parse")
    }
}
