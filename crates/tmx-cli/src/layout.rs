use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tmx_api::{header_file_name, source_file_name, Dialect, SHARED_HEADER_FILE_NAME};
use tmx_core::TmxError;

use crate::map_cli_build_dir;

/// Directory layout of everything the tool writes under `--build`.
#[derive(Debug, Clone)]
pub(crate) struct BuildLayout {
    root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MapOutputs {
    pub(crate) image: Option<PathBuf>,
    pub(crate) descriptor: PathBuf,
    pub(crate) header: PathBuf,
    pub(crate) source: PathBuf,
}

impl BuildLayout {
    pub(crate) fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub(crate) fn graphics_dir(&self) -> PathBuf {
        self.root.join("graphics")
    }

    pub(crate) fn include_dir(&self) -> PathBuf {
        self.root.join("include")
    }

    pub(crate) fn src_dir(&self) -> PathBuf {
        self.root.join("src")
    }

    pub(crate) fn shared_header(&self) -> PathBuf {
        self.include_dir().join(SHARED_HEADER_FILE_NAME)
    }

    pub(crate) fn prepare(&self) -> Result<(), TmxError> {
        for directory in [self.graphics_dir(), self.include_dir(), self.src_dir()] {
            fs::create_dir_all(&directory)
                .map_err(|error| map_cli_build_dir(error).in_file(&directory))?;
        }
        Ok(())
    }

    /// `with_image` is false for maps without graphics layers, which get no
    /// background image.
    pub(crate) fn map_outputs(&self, name: &str, dialect: Dialect, with_image: bool) -> MapOutputs {
        let graphics = self.graphics_dir();
        MapOutputs {
            image: with_image.then(|| graphics.join(format!("{}.bmp", name))),
            descriptor: graphics.join(format!("{}.json", name)),
            header: self.include_dir().join(header_file_name(name)),
            source: self.src_dir().join(source_file_name(name, dialect)),
        }
    }
}

impl MapOutputs {
    pub(crate) fn paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(4);
        paths.extend(self.image.clone());
        paths.push(self.descriptor.clone());
        paths.push(self.header.clone());
        paths.push(self.source.clone());
        paths
    }
}

fn modified_or_epoch(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .unwrap_or(UNIX_EPOCH)
}

/// True when the newest input is strictly older than the oldest output.
/// Missing files count as the epoch on both sides.
pub(crate) fn is_up_to_date(inputs: &[PathBuf], outputs: &[PathBuf]) -> bool {
    let newest_input = inputs
        .iter()
        .map(|path| modified_or_epoch(path))
        .max()
        .unwrap_or(UNIX_EPOCH);
    let oldest_output = outputs
        .iter()
        .map(|path| modified_or_epoch(path))
        .min()
        .unwrap_or(UNIX_EPOCH);
    newest_input < oldest_output
}
