use std::fmt::Display;

use tmx_core::TmxError;

fn map_error(code: &'static str, error: impl Display) -> TmxError {
    TmxError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: TmxError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
    );
    1
}

pub(crate) fn map_cli_build_dir(error: std::io::Error) -> TmxError {
    map_error("CLI_BUILD_DIR", error)
}

pub(crate) fn map_cli_map_dir(error: walkdir::Error) -> TmxError {
    map_error("CLI_MAP_DIR_READ", error)
}

pub(crate) fn map_cli_output_write(error: std::io::Error) -> TmxError {
    map_error("CLI_OUTPUT_WRITE", error)
}
