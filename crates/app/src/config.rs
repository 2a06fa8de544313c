use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tally_import::CsvImportProfile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Could not determine a home directory for application data")]
    NoDataDir,
}

/// Settings read from `config.toml`. Every field is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_path: Option<PathBuf>,
    pub import: CsvImportProfile,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "tally", "Tally")
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Reads `path`; a file that does not exist yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `override_path` (command line / environment) wins, then the config
    /// file, then `ledger.db` in the platform data directory.
    pub fn database_path(&self, override_path: Option<&Path>) -> Result<PathBuf, ConfigError> {
        if let Some(path) = override_path.or(self.database_path.as_deref()) {
            return Ok(path.to_path_buf());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join("ledger.db"))
            .ok_or(ConfigError::NoDataDir)
    }
}
