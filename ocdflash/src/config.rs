use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ocdflash_lib::RunfilesLocation;
use serde::{Deserialize, Serialize};

/// Environment variable pointing at the JSON configuration file.
pub const CONFIG_ENV: &str = "OCDFLASH_CONFIG";

/// Root of the JSON configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcdFlashConfig {
    /// Runfiles manifest used when `RUNFILES_MANIFEST_FILE` is unset
    #[serde(default)]
    pub runfiles_manifest: Option<PathBuf>,
    /// Runfiles directory used when `RUNFILES_DIR` is unset
    #[serde(default)]
    pub runfiles_dir: Option<PathBuf>,
}

impl OcdFlashConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        Ok(config)
    }

    /// Load the file named by `OCDFLASH_CONFIG`, or the defaults when unset.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            Some(path) => Self::from_file(PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }

    /// Runfiles location to use. Any runfiles variable set in the
    /// environment overrides both entries of the file.
    pub fn runfiles_location(&self, env: RunfilesLocation) -> RunfilesLocation {
        if env.manifest_file.is_some() || env.runfiles_dir.is_some() {
            return env;
        }
        env.or(RunfilesLocation {
            manifest_file: self.runfiles_manifest.clone(),
            runfiles_dir: self.runfiles_dir.clone(),
            argv0: None,
        })
    }
}
