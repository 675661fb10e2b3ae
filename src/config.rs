//! Runtime settings.
//!
//! Layered, later wins:
//!
//! 1. built-in defaults
//! 2. `cyberaware.yaml` in the working directory (or `--config`)
//! 3. `CYBERAWARE_DATA_DIR`, `CYBERAWARE_USER` environment variables
//! 4. command-line flags (applied by `main`)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::Result;

pub const CONFIG_FILE: &str = "cyberaware.yaml";
pub const ENV_DATA_DIR: &str = "CYBERAWARE_DATA_DIR";
pub const ENV_USER: &str = "CYBERAWARE_USER";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where tasks and journals are written.
    pub data_dir: PathBuf,
    /// Optional directory overriding the embedded YAML vocabulary and quiz.
    pub vocab_dir: Option<PathBuf>,
    pub user_name: Option<String>,
    /// Keep line-editor history in the home directory.
    pub history: bool,
    /// Fixed seed for tip order; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_dir: PathBuf::from("."),
            vocab_dir: None,
            user_name: None,
            history: true,
            seed: None,
        }
    }
}

impl Settings {
    /// Defaults overlaid with a settings file and the environment.
    ///
    /// An explicit `path` must be readable. Without one, `cyberaware.yaml`
    /// in the working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        let mut settings = match path {
            Some(path) => {
                log::debug!("settings from {}", path.display());
                Settings::from_yaml(&std::fs::read_to_string(path)?)?
            }
            None => match std::fs::read_to_string(CONFIG_FILE) {
                Ok(text) => {
                    log::debug!("settings from {}", CONFIG_FILE);
                    Settings::from_yaml(&text)?
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Settings::default(),
                Err(e) => return Err(e.into()),
            },
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_yaml(text: &str) -> Result<Settings> {
        if text.trim().is_empty() {
            return Ok(Settings::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Apply environment overrides through `lookup` (injectable for tests).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(user) = lookup(ENV_USER).filter(|v| !v.trim().is_empty()) {
            self.user_name = Some(user.trim().to_string());
        }
    }
}
