use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::TestResult;

pub const CONFIG_FILE: &str = "verdict.toml";

/// Settings read from `verdict.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub json: bool,
    pub expect: TestResult,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            json: false,
            expect: TestResult::Success,
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Loads the config at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Loads `explicit` if given, otherwise the nearest `verdict.toml` above
    /// the current directory, otherwise the defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match find_config_file() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }
}

/// Finds `verdict.toml` by walking up from the current directory.
/// Returns `None` if there is none.
pub fn find_config_file() -> Option<PathBuf> {
    let current_dir = std::env::current_dir().ok()?;
    find_config_file_from(&current_dir)
}

fn find_config_file_from(start: &Path) -> Option<PathBuf> {
    let mut dir = start;

    loop {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }

        dir = dir.parent()?;
    }
}
