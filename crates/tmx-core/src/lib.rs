pub mod descriptor;
pub mod error;
pub mod ident;
pub mod types;

pub use descriptor::{LayerSelection, MapDescriptor};
pub use error::TmxError;
pub use ident::{is_identifier, is_reserved_word, sanitize_identifier};
pub use types::*;
