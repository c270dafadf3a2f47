//! Application configuration for doccapture.
//!
//! User config lives at `~/.doccapture/doccapture.toml`.
//! CLI flags override manifest entries, which override `[defaults]`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CaptureError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "doccapture.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".doccapture";

// ---------------------------------------------------------------------------
// Config structs (matching doccapture.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Named manifests. These shadow built-ins of the same name.
    #[serde(default)]
    pub manifests: Vec<ManifestConfig>,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Base directory manifest paths are relative to. `~` is expanded.
    /// Falls back to the working directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<String>,
}

/// `[[manifests]]` entry — a named, ordered list of files to capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// Name used on the command line (`doccapture capture <name>`).
    pub name: String,
    /// Title written in the report header.
    pub title: String,
    /// Report file name. Relative paths resolve against the base directory.
    pub output: String,
    /// Per-manifest base directory, overriding `[defaults]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<String>,
    /// Relative paths, in report order. Duplicates are kept.
    #[serde(default)]
    pub files: Vec<String>,
}

impl AppConfig {
    /// Look up a manifest defined in this config by name.
    pub fn find_manifest(&self, name: &str) -> Option<&ManifestConfig> {
        self.manifests.iter().find(|m| m.name == name)
    }

    /// Check manifest names are unique and every manifest is usable.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for manifest in &self.manifests {
            if manifest.name.trim().is_empty() {
                return Err(CaptureError::validation("manifest name must not be empty"));
            }
            if !seen.insert(manifest.name.as_str()) {
                return Err(CaptureError::validation(format!(
                    "duplicate manifest name '{}'",
                    manifest.name
                )));
            }
            if manifest.title.trim().is_empty() {
                return Err(CaptureError::validation(format!(
                    "manifest '{}' has an empty title",
                    manifest.name
                )));
            }
            if manifest.output.trim().is_empty() {
                return Err(CaptureError::validation(format!(
                    "manifest '{}' has an empty output path",
                    manifest.name
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.doccapture/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| CaptureError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.doccapture/doccapture.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CaptureError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        CaptureError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;

    tracing::debug!(?path, manifests = config.manifests.len(), "loaded config");
    Ok(config)
}

/// Write `config` to `path`, creating parent directories.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn write_config(path: &Path, config: &AppConfig, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CaptureError::config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CaptureError::io(parent, e))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| CaptureError::Serialization(e.to_string()))?;
    std::fs::write(path, content).map_err(|e| CaptureError::io(path, e))?;
    tracing::info!(?path, "wrote config file");

    Ok(())
}

/// Create the config directory and write `config` as the user config file.
/// Returns the path to the created file.
pub fn init_config(config: &AppConfig, force: bool) -> Result<PathBuf> {
    let path = config_file_path()?;
    write_config(&path, config, force)?;
    Ok(path)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
