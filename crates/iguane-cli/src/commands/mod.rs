pub mod convert;
pub mod list;
pub mod score;
pub mod show;
pub mod validate;

use std::borrow::Cow;
use std::path::Path;

use iguane::error::IguaneError;
use iguane::spec::{SpecTable, builtin_table, parse_table};

/// The table from `data`, or the bundled one.
pub fn load_table(data: Option<&Path>) -> Result<Cow<'static, SpecTable>, IguaneError> {
    match data {
        Some(path) => Ok(Cow::Owned(parse_table(path)?)),
        None => Ok(Cow::Borrowed(builtin_table()?)),
    }
}
