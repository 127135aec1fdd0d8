use std::path::PathBuf;

use clap::Parser;
use tmx_api::Dialect;

#[derive(Debug, Parser)]
#[command(name = "tmx-cli")]
#[command(about = "Compiles Tiled maps into C and C++ sources")]
pub(crate) struct Cli {
    /// Output dialect: butano, cpp or c.
    #[arg(long = "target", default_value = "butano", value_parser = parse_target)]
    pub(crate) target: Dialect,
    /// Root directory of the generated files.
    #[arg(long = "build")]
    pub(crate) build: PathBuf,
    /// Directories holding `.tmx` maps and their `.json` sidecars.
    #[arg(required = true)]
    pub(crate) map_dirs: Vec<PathBuf>,
}

fn parse_target(raw: &str) -> Result<Dialect, String> {
    Dialect::parse(raw).map_err(|error| error.message)
}
