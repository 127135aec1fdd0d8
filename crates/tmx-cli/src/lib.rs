use std::ffi::OsString;

use clap::Parser;
use tmx_core::TmxError;

mod cli_args;
mod driver;
mod error_map;
mod layout;

pub(crate) use cli_args::Cli;
pub(crate) use driver::{run_build, BuildSummary};
pub(crate) use error_map::{emit_error, map_cli_build_dir, map_cli_map_dir, map_cli_output_write};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, TmxError> {
    let summary = run_build(&cli.map_dirs, &cli.build, cli.target)?;
    emit_summary(&summary);
    Ok(if summary.failed == 0 { 0 } else { 1 })
}

fn emit_summary(summary: &BuildSummary) {
    if summary.failed == 0 {
        println!("RESULT:OK");
    } else {
        println!("RESULT:FAILED");
    }
    println!("MAPS_BUILT:{}", summary.built);
    println!("MAPS_SKIPPED:{}", summary.skipped);
    println!("MAPS_FAILED:{}", summary.failed);
}

#[cfg(test)]
pub(crate) mod cli_test_support {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub(crate) fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!("tmx-cli-{}-{}", name, nanos))
    }

    pub(crate) fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent should be created");
        }
        fs::write(path, content).expect("file should be written");
    }

    /// Sets the modification time of `path` to `seconds` ago.
    pub(crate) fn set_age(path: &Path, seconds: u64) {
        let time = SystemTime::now() - Duration::from_secs(seconds);
        fs::File::options()
            .write(true)
            .open(path)
            .expect("file should open")
            .set_modified(time)
            .expect("mtime should be set");
    }

    /// Ages every file under `root` so freshly written outputs are newer.
    pub(crate) fn age_tree(root: &Path, seconds: u64) {
        for entry in walkdir::WalkDir::new(root) {
            let entry = entry.expect("tree should walk");
            if entry.file_type().is_file() {
                set_age(entry.path(), seconds);
            }
        }
    }
}
