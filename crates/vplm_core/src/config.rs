//! Save configuration
//!
//! ```rust
//! use vplm_core::config::{ArrayLayout, SaveConfig};
//!
//! let config = SaveConfig::default();
//! assert_eq!(config.array_layout, ArrayLayout::Shaped);
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::save::SaveError;

/// How DOE arrays are written to section 12
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayLayout {
    /// `shape <rows> <cols>` header, then one row per line
    #[default]
    Shaped,
    /// Bracketed rows as older saves contain them
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    /// Directory receiving quick saves and model exports
    pub work_dir: PathBuf,
    /// Session file name prefix (default: "pyVPLM")
    pub session_prefix: String,
    /// Session file extension without the dot (default: "txt")
    pub session_extension: String,
    /// Exported model file name prefix (default: "pyvplm_model")
    pub model_prefix: String,
    pub array_layout: ArrayLayout,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            session_prefix: "pyVPLM".to_string(),
            session_extension: "txt".to_string(),
            model_prefix: "pyvplm_model".to_string(),
            array_layout: ArrayLayout::Shaped,
        }
    }
}

impl SaveConfig {
    pub fn with_work_dir(work_dir: impl Into<PathBuf>) -> Self {
        Self { work_dir: work_dir.into(), ..Self::default() }
    }

    /// Read a configuration from a JSON file; missing keys keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self, SaveError> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| SaveError::InvalidConfig {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
