use serde::{Deserialize, Serialize};

use crate::error::TmxError;
use crate::types::LayerPath;

/// One declared output layer: either a single source layer path or a stack
/// of source layer paths listed bottom to top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayerSelection {
    Single(String),
    Stack(Vec<String>),
}

impl LayerSelection {
    pub fn paths(&self) -> Result<Vec<LayerPath>, TmxError> {
        let raw = match self {
            Self::Single(path) => std::slice::from_ref(path),
            Self::Stack(paths) => paths.as_slice(),
        };
        if raw.is_empty() {
            return Err(TmxError::new(
                "LAYER_PATH_INVALID",
                "A layer declaration must list at least one layer path.",
            ));
        }
        raw.iter().map(|path| LayerPath::parse(path)).collect()
    }
}

/// Sidecar descriptor declaring which source layers feed each output role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDescriptor {
    #[serde(default)]
    pub graphics: Vec<LayerSelection>,
    #[serde(default)]
    pub objects: Vec<LayerSelection>,
    #[serde(default)]
    pub tiles: Vec<LayerSelection>,
}

impl MapDescriptor {
    pub fn from_json_str(source: &str) -> Result<Self, TmxError> {
        serde_json::from_str(source)
            .map_err(|error| TmxError::new("DESCRIPTOR_INVALID", error.to_string()))
    }
}
