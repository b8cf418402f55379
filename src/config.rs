//! Host-supplied configuration
//!
//! The engine consumes an already-materialized configuration; how the host
//! loads it (CLI flags, config file, plugin options) is out of scope. A TOML
//! rendition is supported directly because that is the most common host
//! format; unknown keys are collected as warnings rather than rejected.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Dir2jsonResult;
use crate::tree::CollisionPolicy;

/// Default file name for the generated declaration artifact
pub const DEFAULT_DTS_FILE: &str = "dir2json.d.ts";

/// Engine configuration, consumed (not owned) by the build pipeline
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Dir2jsonConfig {
    /// Named extension groups, selectable via the `extg` query key
    #[serde(default)]
    pub ext_group: HashMap<String, Vec<String>>,

    /// Declaration-artifact generation mode
    #[serde(default)]
    pub dts: DtsMode,

    /// Key-collision policy for tree construction
    #[serde(default)]
    pub collisions: CollisionPolicy,
}

/// Declaration generation mode
///
/// Accepts three shapes: `false` disables, `true` selects the default
/// artifact path, a string selects an explicit path (resolved against the
/// session root when relative).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DtsMode {
    Disabled,
    #[default]
    Default,
    Path(PathBuf),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DtsModeDe {
    Enabled(bool),
    Path(PathBuf),
}

impl<'de> Deserialize<'de> for DtsMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match DtsModeDe::deserialize(deserializer)? {
            DtsModeDe::Enabled(true) => Ok(Self::Default),
            DtsModeDe::Enabled(false) => Ok(Self::Disabled),
            DtsModeDe::Path(path) => Ok(Self::Path(path)),
        }
    }
}

impl Serialize for DtsMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Disabled => serializer.serialize_bool(false),
            Self::Default => serializer.serialize_bool(true),
            Self::Path(path) => path.serialize(serializer),
        }
    }
}

impl Dir2jsonConfig {
    /// Parse a TOML rendition of the configuration
    ///
    /// Returns the config plus the list of unknown keys encountered; unknown
    /// keys are preserved-but-ignored rather than rejected.
    pub fn from_toml_str(input: &str) -> Dir2jsonResult<(Self, Vec<String>)> {
        let mut unknown = Vec::new();
        let de = toml::Deserializer::new(input);
        let config = serde_ignored::deserialize(de, |path| unknown.push(path.to_string()))?;
        Ok((config, unknown))
    }

    /// Resolve the declaration artifact path against the session root
    ///
    /// Returns `None` when generation is disabled.
    pub fn dts_file_path(&self, root: &Path) -> Option<PathBuf> {
        match &self.dts {
            DtsMode::Disabled => None,
            DtsMode::Default => Some(root.join(DEFAULT_DTS_FILE)),
            DtsMode::Path(path) => {
                if path.is_absolute() {
                    Some(path.clone())
                } else {
                    Some(root.join(path))
                }
            }
        }
    }

    /// Look up an extension group by name
    pub fn ext_group(&self, name: &str) -> Option<&[String]> {
        self.ext_group.get(name).map(|v| v.as_slice())
    }
}
