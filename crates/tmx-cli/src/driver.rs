use std::fs;
use std::path::{Path, PathBuf};

use tmx_api::{open_map, shared_header, Dialect};
use tmx_core::TmxError;
use walkdir::WalkDir;

use crate::layout::{is_up_to_date, BuildLayout};
use crate::{map_cli_map_dir, map_cli_output_write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MapOutcome {
    Built,
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct BuildSummary {
    pub(crate) built: usize,
    pub(crate) skipped: usize,
    pub(crate) failed: usize,
}

/// Builds every map of every directory. A failing map is logged and counted;
/// only errors outside a single map abort the run.
pub(crate) fn run_build(
    map_dirs: &[PathBuf],
    build_root: &Path,
    dialect: Dialect,
) -> Result<BuildSummary, TmxError> {
    let layout = BuildLayout::new(build_root);
    layout.prepare()?;
    write_output(&layout.shared_header(), shared_header(dialect))?;

    let mut summary = BuildSummary::default();
    for map_dir in map_dirs {
        for map_path in discover_maps(map_dir)? {
            match build_map(&map_path, &layout, dialect) {
                Ok(MapOutcome::Built) => {
                    tracing::info!(map = %map_path.display(), target = dialect.name(), "built");
                    summary.built += 1;
                }
                Ok(MapOutcome::Skipped) => {
                    tracing::info!(map = %map_path.display(), "up to date, skipped");
                    summary.skipped += 1;
                }
                Err(error) => {
                    tracing::error!(map = %map_path.display(), code = %error.code, "{}", error.message);
                    summary.failed += 1;
                }
            }
        }
    }
    Ok(summary)
}

/// The `.tmx` files directly inside `map_dir`, sorted by path.
pub(crate) fn discover_maps(map_dir: &Path) -> Result<Vec<PathBuf>, TmxError> {
    let mut maps = Vec::new();
    for entry in WalkDir::new(map_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(map_cli_map_dir)?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "tmx") {
            maps.push(path.to_path_buf());
        }
    }
    maps.sort();
    tracing::debug!(directory = %map_dir.display(), maps = maps.len(), "maps discovered");
    Ok(maps)
}

pub(crate) fn build_map(
    map_path: &Path,
    layout: &BuildLayout,
    dialect: Dialect,
) -> Result<MapOutcome, TmxError> {
    let source = open_map(map_path)?;
    let outputs = layout.map_outputs(&source.name, dialect, source.has_graphics());
    if header_matches(&outputs.header, dialect)
        && is_up_to_date(&source.input_paths(), &outputs.paths())
    {
        return Ok(MapOutcome::Skipped);
    }

    let artifacts = source.compile(dialect)?;
    if let (Some(path), Some(image)) = (&outputs.image, &artifacts.background_image) {
        write_output(path, image)?;
    }
    write_output(&outputs.descriptor, &artifacts.background_descriptor)?;
    write_output(&outputs.header, &artifacts.sources.header)?;
    write_output(&outputs.source, &artifacts.sources.source)?;
    Ok(MapOutcome::Built)
}

/// Headers share one file name across dialects; the banner tells them apart.
fn header_matches(header: &Path, dialect: Dialect) -> bool {
    fs::read_to_string(header)
        .map(|contents| contents.starts_with(&dialect.header_banner()))
        .unwrap_or(false)
}

fn write_output(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), TmxError> {
    fs::write(path, contents).map_err(|error| map_cli_output_write(error).in_file(path))
}
