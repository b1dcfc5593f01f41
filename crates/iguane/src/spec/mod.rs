mod lexer;
mod parser;
mod types;
mod validator;

use once_cell::sync::OnceCell;

use crate::error::IguaneError;

pub use parser::{parse_table, parse_table_json, parse_table_str};
pub use types::*;
pub use validator::validate_table;

/// The bundled GPU data file, in the legacy record format.
pub const BUILTIN_SOURCE: &str = include_str!("../../data/gpuflops.txt");

static BUILTIN: OnceCell<SpecTable> = OnceCell::new();

/// The bundled table, parsed on first use and shared for the rest of the
/// process.
///
/// A parse failure is not cached: every call reports it again, and no
/// partial table is ever handed out.
pub fn builtin_table() -> Result<&'static SpecTable, IguaneError> {
    BUILTIN.get_or_try_init(|| parse_table_str(BUILTIN_SOURCE))
}
