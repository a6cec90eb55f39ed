//! Configuration file data structures

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::diff::VisibilityMode;
use crate::fmt::ColorChoice;
use crate::scanner::normalize::DEFAULT_PLACEHOLDER;
use crate::scanner::{NormalizeOptions, DEFAULT_KEYWORD};

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = ".compilecmp.toml";

/// Default bound of each producer's package queue
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Top-level keys understood in the configuration file
pub const KNOWN_KEYS: [&str; 3] = ["mode", "color", "scanner"];

/// Keys understood in the `[scanner]` table
pub const KNOWN_SCANNER_KEYS: [&str; 4] =
    ["keyword", "placeholder", "strip-noise", "channel-capacity"];

/// compilecmp configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Default visibility mode for `funcs`
    #[serde(default)]
    pub mode: VisibilityMode,

    /// When to colorize output
    #[serde(default)]
    pub color: ColorChoice,

    /// Scanner and normalization settings
    #[serde(default)]
    pub scanner: ScannerSettings,
}

/// `[scanner]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ScannerSettings {
    /// Header keyword marking functions
    pub keyword: String,
    /// Replacement for each build's token
    pub placeholder: String,
    /// Leave byte-dump and relocation lines out of the content hash
    pub strip_noise: bool,
    /// Packages buffered per producer before it waits
    pub channel_capacity: usize,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            keyword: DEFAULT_KEYWORD.to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            strip_noise: true,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ScannerSettings {
    /// Normalization options shared by both sides
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            placeholder: self.placeholder.clone(),
            strip_noise: self.strip_noise,
        }
    }

    /// Reject settings the scanner cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.keyword.trim().is_empty() {
            anyhow::bail!("scanner.keyword must not be empty");
        }
        if self.keyword.contains(' ') {
            anyhow::bail!(
                "scanner.keyword '{}' must be a single word",
                self.keyword
            );
        }
        if self.channel_capacity == 0 {
            anyhow::bail!("scanner.channel-capacity must be at least 1");
        }
        Ok(())
    }
}

impl ConfigFile {
    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.scanner.validate()
    }
}
