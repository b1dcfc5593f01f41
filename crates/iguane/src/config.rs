//! Front-end configuration file.
//!
//! ```yaml
//! fom: ugr
//! ugr_version: "1.0-renorm"
//! data: /etc/iguane/gpuflops.txt
//! ```
//!
//! Every key is optional. Command-line flags take precedence over the
//! file, and the file over the built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::IguaneError;
use crate::fom::weights::DEFAULT_UGR_VERSION;
use crate::fom::{Fom, FomArgs};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IguaneConfig {
    #[serde(default = "default_fom")]
    pub fom: String,
    #[serde(default = "default_ugr_version")]
    pub ugr_version: String,
    /// Alternative GPU data file; the bundled table when absent.
    #[serde(default)]
    pub data: Option<PathBuf>,
}

fn default_fom() -> String {
    Fom::Ugr.name().to_string()
}

fn default_ugr_version() -> String {
    DEFAULT_UGR_VERSION.to_string()
}

impl Default for IguaneConfig {
    fn default() -> Self {
        Self {
            fom: default_fom(),
            ugr_version: default_ugr_version(),
            data: None,
        }
    }
}

impl IguaneConfig {
    pub fn fom(&self) -> Result<Fom, IguaneError> {
        self.fom.parse()
    }

    pub fn fom_args(&self) -> FomArgs {
        FomArgs::with_ugr_version(self.ugr_version.clone())
    }
}

/// Load a YAML configuration file.
///
/// # Errors
///
/// Returns [`IguaneError::Io`] if the file cannot be read,
/// or [`IguaneError::Yaml`] if the YAML is malformed.
pub fn load_config(path: &Path) -> Result<IguaneConfig, IguaneError> {
    let content = std::fs::read_to_string(path)?;
    parse_config_str(&content)
}

/// Parse a YAML configuration from a string. An empty document yields
/// the defaults.
pub fn parse_config_str(yaml: &str) -> Result<IguaneConfig, IguaneError> {
    if yaml.trim().is_empty() {
        return Ok(IguaneConfig::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}
