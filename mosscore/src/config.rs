use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{MossError, MossResult};

/// Name of the environment variable containing the path to the configuration file.
/// If not set, defaults to
///  (1) on Linux and macOS: `$XDG_CONFIG_HOME/moss/config.toml` or `$HOME/.config/moss/config.toml`
///  (2) on Windows: `%APPDATA%\moss\config.toml`
pub const ENV_CONFIG_PATH: &str = "MOSS_CONFIG";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Command run on the exported results; `{}` is replaced by the maildir path.
    pub viewer: String,
    /// Spaces per indentation level of the tree display.
    pub indent: usize,
    pub color: ColorMode,
    /// Keep an in-session line history.
    pub history: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            viewer: "mutt -f {}".to_string(),
            indent: 2,
            color: ColorMode::Auto,
            history: true,
        }
    }
}

impl Config {
    /// Get the default path to the configuration file.
    pub fn default_path() -> PathBuf {
        if let Ok(config_path) = std::env::var(ENV_CONFIG_PATH) {
            return config_path.into();
        }

        let mut path = PathBuf::new();

        #[cfg(target_os = "windows")]
        {
            if let Ok(appdata) = std::env::var("APPDATA") {
                path.push(appdata);
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
                path.push(xdg_config_home);
            } else if let Ok(home) = std::env::var("HOME") {
                path.push(home);
                path.push(".config");
            }
        }

        path.push("moss");
        path.push("config.toml");
        path
    }

    pub fn from_toml_str(text: &str, file: &Path) -> MossResult<Self> {
        toml::from_str(text).map_err(|e| MossError::ConfigParse {
            source: e,
            file: file.display().to_string(),
        })
    }

    /// Load a configuration from a TOML file.
    pub fn load_from_toml(path: &Path) -> MossResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text, path)
    }

    /// Load the explicit file if given, else the default file if it exists, else the
    /// defaults.
    pub fn load(explicit: Option<&Path>) -> MossResult<Self> {
        if let Some(path) = explicit {
            return Self::load_from_toml(path);
        }
        let path = Self::default_path();
        if path.is_file() {
            debug!("Loading configuration from {}", path.display());
            Self::load_from_toml(&path)
        } else {
            debug!("No configuration at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }
}
