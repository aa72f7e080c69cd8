use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::scanner::keywords::KeywordSplit;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub scanner: ScannerConfig,

    #[serde(default)]
    pub keywords: KeywordConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[default]
    Sqlite,
    Postgresql,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: DatabaseType,

    #[serde(default = "default_db_path")]
    pub sqlite_path: PathBuf,

    /// Connection string, e.g. `host=localhost user=maxp dbname=lbx` or a
    /// `postgresql://` URL.
    #[serde(default)]
    pub postgresql_url: Option<String>,
}

impl DatabaseConfig {
    /// Point the config at `url`: `postgres://`/`postgresql://` selects
    /// PostgreSQL, anything else is taken as a SQLite file path.
    pub fn apply_url(&mut self, url: &str) {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            self.backend = DatabaseType::Postgresql;
            self.postgresql_url = Some(url.to_string());
        } else {
            self.backend = DatabaseType::Sqlite;
            self.sqlite_path = PathBuf::from(url);
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseType::default(),
            sqlite_path: default_db_path(),
            postgresql_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Directory tree imported when none is given on the command line.
    #[serde(default)]
    pub root: Option<PathBuf>,

    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            root: None,
            image_extensions: default_image_extensions(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct KeywordConfig {
    #[serde(default)]
    pub split: KeywordSplit,

    /// Insert a token shared by description and directory name only once.
    #[serde(default)]
    pub merge_sources: bool,
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("exifscan")
        .join("exifscan.db")
}

fn default_image_extensions() -> Vec<String> {
    vec![
        "jpg".to_string(),
        "jpeg".to_string(),
        "png".to_string(),
        "tiff".to_string(),
        "bmp".to_string(),
        "gif".to_string(),
    ]
}

impl Config {
    /// Load from the default location. A missing file means defaults.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        let mut config = if path.exists() {
            Self::read(&path)?
        } else {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            Config::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Load from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::read(path)?;
        config.apply_env();
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Some(root) = std::env::var_os("EXIFSCAN_ROOT") {
            self.scanner.root = Some(PathBuf::from(root));
        }
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("exifscan")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}
