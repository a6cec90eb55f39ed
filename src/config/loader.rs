//! Configuration file loading

use super::file::{ConfigFile, CONFIG_FILE_NAME, KNOWN_KEYS, KNOWN_SCANNER_KEYS};
use crate::error::CompileCmpError;
use crate::infra::{FileSystem, RealFileSystem};
use anyhow::{Context, Result};
use std::path::Path;

/// Handles loading configuration files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from .compilecmp.toml in the given directory
    ///
    /// A missing file yields the defaults.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use compilecmp::config::ConfigLoader;
    /// use std::path::Path;
    ///
    /// let config = ConfigLoader::load(Path::new("."))?;
    /// println!("default mode: {}", config.mode);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(project_root: &Path) -> Result<ConfigFile> {
        Self::load_with_fs(project_root, &RealFileSystem)
    }

    /// Load config with a custom filesystem implementation
    pub fn load_with_fs<FS: FileSystem>(project_root: &Path, fs: &FS) -> Result<ConfigFile> {
        let config_path = project_root.join(CONFIG_FILE_NAME);

        // Read file atomically - no TOCTOU race window
        let contents = match fs.read_to_string(&config_path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no {} found, using defaults", CONFIG_FILE_NAME);
                return Ok(ConfigFile::default());
            }
            Err(e) => {
                return Err(e).context("Failed to read .compilecmp.toml");
            }
        };

        Self::parse(&contents, &config_path)
    }

    /// Load an explicitly named config file, which must exist
    pub fn load_path(path: &Path) -> Result<ConfigFile> {
        Self::load_path_with_fs(path, &RealFileSystem)
    }

    /// Load an explicitly named config file with a custom filesystem
    pub fn load_path_with_fs<FS: FileSystem>(path: &Path, fs: &FS) -> Result<ConfigFile> {
        let contents = fs.read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                anyhow::Error::new(CompileCmpError::ConfigNotFound {
                    path: path.to_path_buf(),
                    source,
                })
            } else {
                anyhow::Error::new(source)
                    .context(format!("Failed to read {}", path.display()))
            }
        })?;

        Self::parse(&contents, path)
    }

    fn parse(contents: &str, path: &Path) -> Result<ConfigFile> {
        warn_unknown_keys(contents, path);

        let config: ConfigFile = toml_edit::de::from_str(contents).map_err(|e| {
            CompileCmpError::InvalidConfig {
                path: path.to_path_buf(),
                message: e.to_string().trim().to_string(),
            }
        })?;

        config
            .validate()
            .map_err(|e| CompileCmpError::InvalidConfig {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Ok(config)
    }
}

/// Log keys that will be ignored
fn warn_unknown_keys(contents: &str, path: &Path) {
    for key in unknown_keys(contents) {
        log::warn!("ignoring unknown key '{}' in {}", key, path.display());
    }
}

/// Dotted paths of keys the configuration model does not read
fn unknown_keys(contents: &str) -> Vec<String> {
    let Ok(document) = contents.parse::<toml_edit::DocumentMut>() else {
        // The serde pass reports syntax errors
        return Vec::new();
    };

    let mut unknown = Vec::new();
    for (key, item) in document.iter() {
        if !KNOWN_KEYS.contains(&key) {
            unknown.push(key.to_string());
            continue;
        }
        if key == "scanner" {
            if let Some(table) = item.as_table_like() {
                for (inner, _) in table.iter() {
                    if !KNOWN_SCANNER_KEYS.contains(&inner) {
                        unknown.push(format!("scanner.{}", inner));
                    }
                }
            }
        }
    }
    unknown
}
