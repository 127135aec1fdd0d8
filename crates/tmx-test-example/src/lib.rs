use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

pub fn demos_root() -> PathBuf {
    workspace_root().join("demos").join("maps")
}

pub fn demo_map(name: &str) -> PathBuf {
    demos_root().join(format!("{}.tmx", name))
}

/// Copies the demo maps directory, tilesets included, under `destination`
/// so tests can touch or break files without modifying the workspace.
pub fn copy_demo_maps(destination: &Path) -> io::Result<PathBuf> {
    let source = demos_root();
    for entry in WalkDir::new(&source) {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(&source) else {
            continue;
        };
        let target = destination.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(destination.to_path_buf())
}
