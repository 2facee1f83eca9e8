//! Configuration loading and validation.
//!
//! Settings live in an optional `clipbake.toml` next to the documents being
//! converted; a missing file means defaults. Command-line flags override the
//! file (see `cli::args`).

use owo_colors::OwoColorize;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file name looked up in the working directory.
pub const CONFIG_FILE: &str = "clipbake.toml";

// ============================================================================
// Errors
// ============================================================================

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Validation(ConfigDiagnostic),
}

/// A single configuration diagnostic
#[derive(Debug, Clone)]
pub struct ConfigDiagnostic {
    /// Config field path (e.g., "rasterizer.command")
    pub field: String,
    /// Error description
    pub message: String,
    /// Fix hint (optional)
    pub hint: Option<String>,
}

impl ConfigDiagnostic {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}{}{}", "[".dimmed(), self.field.cyan(), "]".dimmed())?;
        write!(f, "{} {}", "→".red(), self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n  {} {}", "hint:".yellow(), hint)?;
        }
        Ok(())
    }
}

// ============================================================================
// Sections
// ============================================================================

/// `[rasterizer]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RasterizerConfig {
    /// Command array invoked for isolated exports, e.g. `["inkscape"]` or
    /// `["flatpak", "run", "org.inkscape.Inkscape"]`.
    #[serde(default = "default_rasterizer_command")]
    pub command: Vec<String>,
}

fn default_rasterizer_command() -> Vec<String> {
    vec!["inkscape".to_string()]
}

impl Default for RasterizerConfig {
    fn default() -> Self {
        Self {
            command: default_rasterizer_command(),
        }
    }
}

/// `[export]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Target resolution in dots per inch.
    #[serde(default = "default_dpi")]
    pub dpi: f64,

    /// Losslessly re-encode exported bitmaps before embedding.
    #[serde(default = "default_optimize")]
    pub optimize: bool,
}

fn default_dpi() -> f64 {
    96.0
}

fn default_optimize() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dpi: default_dpi(),
            optimize: default_optimize(),
        }
    }
}

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rasterizer: RasterizerConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_str(&content)
    }

    /// Load `clipbake.toml` from `dir`, falling back to defaults when the
    /// file does not exist.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Self::from_path(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check that the configured rasterizer can actually be invoked and the
    /// export parameters are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Some(program) = self.rasterizer.command.first() else {
            return Err(ConfigError::Validation(
                ConfigDiagnostic::new("rasterizer.command", "command array is empty")
                    .with_hint("set rasterizer.command = [\"inkscape\"]"),
            ));
        };

        if which::which(program).is_err() {
            return Err(ConfigError::Validation(
                ConfigDiagnostic::new(
                    "rasterizer.command",
                    format!("`{program}` command not found in PATH"),
                )
                .with_hint(
                    "install Inkscape, or point rasterizer.command at another SVG rasterizer",
                ),
            ));
        }

        if self.export.dpi <= 0.0 {
            return Err(ConfigError::Validation(
                ConfigDiagnostic::new(
                    "export.dpi",
                    format!("dpi must be positive, got {}", self.export.dpi),
                )
                .with_hint("pick one of the supported resolutions: 50, 72 or 96"),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.rasterizer.command, vec!["inkscape"]);
        assert_eq!(config.export.dpi, 96.0);
        assert!(config.export.optimize);
    }

    #[test]
    fn test_full_file() {
        let config = Config::from_str(
            r#"
[rasterizer]
command = ["flatpak", "run", "org.inkscape.Inkscape"]

[export]
dpi = 72.0
optimize = false
"#,
        )
        .unwrap();
        assert_eq!(config.rasterizer.command.len(), 3);
        assert_eq!(config.export.dpi, 72.0);
        assert!(!config.export.optimize);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = Config::from_str("[export]\ndpi = 50.0\n").unwrap();
        assert_eq!(config.export.dpi, 50.0);
        assert!(config.export.optimize);
        assert_eq!(config.rasterizer.command, vec!["inkscape"]);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        assert!(matches!(
            Config::from_str("[export\ndpi = 50"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_command() {
        let mut config = Config::default();
        config.rasterizer.command.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("rasterizer.command"));
    }

    #[test]
    fn test_validate_rejects_missing_program() {
        let mut config = Config::default();
        config.rasterizer.command = vec!["definitely-not-a-real-rasterizer".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_dpi() {
        let mut config = Config::default();
        config.rasterizer.command = vec!["sh".to_string()];
        config.export.dpi = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("export.dpi"));
    }
}
