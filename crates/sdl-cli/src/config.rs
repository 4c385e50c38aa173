//! User configuration for the `sdl` CLI.
//!
//! Read from `--config`, `$SDL_CONFIG`, or `<config dir>/sdl/config.toml`:
//!
//! ```toml
//! [format]
//! indent_size = 2
//! semicolons = false
//!
//! [run]
//! shell = "bash"
//! shell_args = ["-c"]
//! ```

use anyhow::{Context, Result};
use sdl_core::FormatConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SdlConfig {
    pub format: FormatSection,
    pub run: RunSection,
}

/// `[format]`: how `fmt`, `add` and `remove` write files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatSection {
    pub indent_size: usize,
    pub semicolons: bool,
}

impl Default for FormatSection {
    fn default() -> Self {
        let defaults = FormatConfig::default();
        Self {
            indent_size: defaults.indent_size,
            semicolons: defaults.semicolons,
        }
    }
}

/// `[run]`: how scripts are executed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSection {
    /// Shell program scripts are handed to
    pub shell: String,
    /// Arguments placed before the script command
    pub shell_args: Vec<String>,
}

impl Default for RunSection {
    fn default() -> Self {
        if cfg!(windows) {
            Self {
                shell: "cmd".to_string(),
                shell_args: vec!["/C".to_string()],
            }
        } else {
            Self {
                shell: "sh".to_string(),
                shell_args: vec!["-c".to_string()],
            }
        }
    }
}

impl SdlConfig {
    /// Default location of the config file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sdl").join("config.toml"))
    }

    /// Load configuration. An explicit path must exist; the default path may be
    /// missing, in which case defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        match Self::config_path() {
            Some(path) if path.is_file() => Self::load_from(&path),
            _ => {
                tracing::debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Formatter settings, with an optional indent override from the command line
    pub fn format_config(&self, indent: Option<usize>) -> FormatConfig {
        FormatConfig {
            indent_size: indent.unwrap_or(self.format.indent_size),
            semicolons: self.format.semicolons,
            trailing_newline: true,
        }
    }
}
