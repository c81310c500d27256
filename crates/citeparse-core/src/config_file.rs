use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub parsing: Option<ParsingSection>,
    pub storage: Option<StorageSection>,
    pub entities: Option<EntitiesSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsingSection {
    pub min_pattern_score: Option<usize>,
    /// `fill-blanks`, `on-no-match` or `heuristic-only`.
    pub fallback_policy: Option<String>,
    /// `lines` or `entries`.
    pub split_mode: Option<String>,
    pub max_authors: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSection {
    pub database_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitiesSection {
    /// `heuristic` or `none`.
    pub recognizer: Option<String>,
}

/// Platform config directory path: `<config_dir>/citeparse/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("citeparse").join("config.toml"))
}

/// Default location of the reference database: `<data_dir>/citeparse/references.db`.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("citeparse").join("references.db"))
}

/// Load config by cascading CWD `.citeparse.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".citeparse.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let bp = base.parsing.unwrap_or_default();
    let op = overlay.parsing.unwrap_or_default();
    let bs = base.storage.unwrap_or_default();
    let os = overlay.storage.unwrap_or_default();
    let be = base.entities.unwrap_or_default();
    let oe = overlay.entities.unwrap_or_default();

    ConfigFile {
        parsing: Some(ParsingSection {
            min_pattern_score: op.min_pattern_score.or(bp.min_pattern_score),
            fallback_policy: op.fallback_policy.or(bp.fallback_policy),
            split_mode: op.split_mode.or(bp.split_mode),
            max_authors: op.max_authors.or(bp.max_authors),
        }),
        storage: Some(StorageSection {
            database_path: os.database_path.or(bs.database_path),
        }),
        entities: Some(EntitiesSection {
            recognizer: oe.recognizer.or(be.recognizer),
        }),
    }
}

/// Save the config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to_path(config, &path)?;
    Ok(path)
}

/// Save the config to an explicit path, creating parent directories.
pub fn save_to_path(config: &ConfigFile, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
