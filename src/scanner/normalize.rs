//! Build-specific noise removal before hashing
//!
//! Two builds of unchanged source still differ in a few places: embedded
//! build identifiers (commit hashes in paths and symbol names) and raw
//! encoded instruction bytes, whose relocation slots move around. The
//! normalizer replaces the build token with a fixed placeholder and flags
//! byte-dump and relocation lines so the scanner can leave them out of the
//! content hash.

use regex::bytes::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::OnceLock;

/// Placeholder substituted for the per-build token
pub const DEFAULT_PLACEHOLDER: &str = "SHA";

/// Cached pattern for encoded instruction byte lines
static BYTE_DUMP_RE: OnceLock<Regex> = OnceLock::new();

/// Settings shared by both sides of a comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeOptions {
    /// Replacement text for the build token
    pub placeholder: String,
    /// Leave byte-dump and relocation lines out of the digest
    pub strip_noise: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            strip_noise: true,
        }
    }
}

/// Per-side line normalizer
///
/// Each side has its own token, but both sides must be built from the same
/// [`NormalizeOptions`] or unchanged functions will hash differently.
#[derive(Debug, Clone)]
pub struct Normalizer {
    token: Option<Regex>,
    placeholder: Vec<u8>,
    strip_noise: bool,
}

impl Normalizer {
    /// Create a normalizer for one build's token
    ///
    /// An empty token disables substitution.
    pub fn new(token: &str, options: &NormalizeOptions) -> Result<Self, regex::Error> {
        let token = if token.is_empty() {
            None
        } else {
            Some(Regex::new(&regex::escape(token))?)
        };

        Ok(Self {
            token,
            placeholder: options.placeholder.as_bytes().to_vec(),
            strip_noise: options.strip_noise,
        })
    }

    /// A normalizer that leaves every line untouched
    pub fn passthrough() -> Self {
        Self {
            token: None,
            placeholder: Vec::new(),
            strip_noise: false,
        }
    }

    /// Replace every occurrence of the build token with the placeholder
    pub fn substitute<'a>(&self, line: &'a [u8]) -> Cow<'a, [u8]> {
        match &self.token {
            Some(re) => re.replace_all(line, regex::bytes::NoExpand(self.placeholder.as_slice())),
            None => Cow::Borrowed(line),
        }
    }

    /// True if a body line should be left out of the content hash
    pub fn is_noise(&self, line: &[u8]) -> bool {
        if !self.strip_noise {
            return false;
        }
        if line.starts_with(b"\trel ") {
            return true;
        }
        let re = BYTE_DUMP_RE.get_or_init(|| {
            // SAFETY: This regex pattern is compile-time validated and will never fail.
            Regex::new(r"^\t0x[0-9a-f]+(?: [0-9a-f]{2})+(?:\s|$)").expect("byte dump regex is valid")
        });
        re.is_match(line)
    }
}
