//! Configuration for compilecmp
//!
//! Settings come from three layers, highest priority first: command-line
//! flags, the `.compilecmp.toml` file, and built-in defaults.

pub mod file;
pub mod loader;

pub use file::{ConfigFile, ScannerSettings, CONFIG_FILE_NAME, DEFAULT_CHANNEL_CAPACITY};
pub use loader::ConfigLoader;
