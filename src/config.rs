//! Configuration file support
//!
//! Loads settings from ~/.phl.toml (or %USERPROFILE%\.phl.toml on Windows)
//!
//! Example:
//! ```text
//! # phl configuration
//! spec-dirs = ["~/.config/phl", "/usr/share/phl"]
//! extension = "phl"
//! font-size = 12
//! color = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::warn;

use crate::error::Result;
use crate::syntax::{DEFAULT_FONT_SIZE, SPEC_EXTENSION};

/// Configuration settings
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directories searched for highlighter definitions
    pub spec_dirs: Vec<PathBuf>,
    /// File extension of definitions in those directories
    pub extension: String,
    /// Font size that rule size offsets are relative to
    pub font_size: f32,
    /// Whether terminal output is styled
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spec_dirs: Vec::new(),
            extension: SPEC_EXTENSION.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            color: true,
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".phl.toml"))
    }

    /// Load configuration from the config file
    ///
    /// A missing file gives the defaults. An unreadable or invalid file
    /// is reported and also gives the defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Config::default();
        };
        if !path.exists() {
            return Config::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring configuration");
                Config::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse config file contents
    pub fn parse(contents: &str) -> Result<Self> {
        let table: Table = contents.parse()?;
        let mut config = Config::default();
        config.apply(&table);
        Ok(config)
    }

    /// Apply settings from a parsed table, ignoring mistyped values
    fn apply(&mut self, table: &Table) {
        if let Some(dirs) = table.get("spec-dirs").and_then(Value::as_array) {
            self.spec_dirs = dirs
                .iter()
                .filter_map(Value::as_str)
                .map(expand_home)
                .collect();
        }

        if let Some(ext) = table.get("extension").and_then(Value::as_str) {
            let ext = ext.trim_start_matches('.');
            if !ext.is_empty() {
                self.extension = ext.to_string();
            }
        }

        match table.get("font-size") {
            Some(Value::Integer(n)) => self.font_size = (*n as f32).clamp(1.0, 400.0),
            Some(Value::Float(n)) => self.font_size = (*n as f32).clamp(1.0, 400.0),
            _ => {}
        }

        if let Some(color) = table.get("color").and_then(Value::as_bool) {
            self.color = color;
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }

    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
