//! Disassembly scanner
//!
//! Turns one compiler assembly listing into a sequence of completed
//! [`PackageRecord`]s. The listing convention is:
//!
//! ```text
//! # strings
//! strings.Index STEXT size=120 args=0x20 locals=0x18
//! 	0x0000 00000 (index.go:10)	TEXT	strings.Index(SB), ABIInternal, $24-32
//! 	0x0000 48 8b 44 24 08 ...
//! 	rel 12+4 t=R_CALL runtime.morestack_noctxt+0
//! go:string."abc" SRODATA dupok size=3
//! # bytes
//! ...
//! ```
//!
//! `# <name>` starts a package, TAB-indented lines are the body of the
//! current symbol, and any other line is a symbol summary header. Only
//! headers carrying the keyword (`STEXT` by default) become functions.
//!
//! [`PackageScanner`] is the synchronous line state machine; [`scan_stream`]
//! runs it as an async producer feeding a channel.

pub mod error;
pub mod header;
pub mod normalize;
pub mod record;
pub mod stream;

pub use error::ScanError;
pub use normalize::{NormalizeOptions, Normalizer};
pub use record::{ContentHash, FunctionRecord, PackageRecord, Side};
pub use stream::{scan_stream, ScanItem};

use sha2::{Digest, Sha256};

/// Keyword marking a summary header as a function (text symbol)
pub const DEFAULT_KEYWORD: &str = "STEXT";

/// Scanner settings
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Header keyword identifying functions
    pub keyword: String,
    /// Line normalizer for this side
    pub normalizer: Normalizer,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            keyword: DEFAULT_KEYWORD.to_string(),
            normalizer: Normalizer::passthrough(),
        }
    }
}

/// Header line awaiting its body
#[derive(Debug)]
struct PendingHeader {
    line: String,
    line_number: u64,
}

/// Line-at-a-time scanner state
///
/// Holds at most one package in progress; a package is handed out as soon
/// as the next `# <name>` marker (or [`finish`](PackageScanner::finish)) is
/// seen.
pub struct PackageScanner {
    config: ScannerConfig,
    package: Option<PackageRecord>,
    header: Option<PendingHeader>,
    hasher: Sha256,
    line_number: u64,
}

impl PackageScanner {
    /// Create a scanner with the given settings
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            config,
            package: None,
            header: None,
            hasher: Sha256::new(),
            line_number: 0,
        }
    }

    /// Feed one line (without its trailing newline)
    ///
    /// Returns the previous package when this line starts a new one.
    pub fn feed_line(&mut self, raw: &[u8]) -> Result<Option<PackageRecord>, ScanError> {
        self.line_number += 1;

        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        if raw.is_empty() {
            return Ok(None);
        }

        if let Some(name) = raw.strip_prefix(b"# ") {
            let finished = self.flush_package()?;
            let name = String::from_utf8_lossy(name).into_owned();
            self.package = Some(PackageRecord::new(name));
            return Ok(finished);
        }

        // Lines before the first package marker are compiler chatter
        if self.package.is_none() {
            return Ok(None);
        }

        let line = self.config.normalizer.substitute(raw);
        if line.first() == Some(&b'\t') {
            if !self.config.normalizer.is_noise(&line) {
                self.hasher.update(&line);
                self.hasher.update(b"\n");
            }
            return Ok(None);
        }

        self.flush_function()?;
        self.header = Some(PendingHeader {
            line: String::from_utf8_lossy(&line).into_owned(),
            line_number: self.line_number,
        });
        Ok(None)
    }

    /// Flush whatever is in progress at end of input
    pub fn finish(&mut self) -> Result<Option<PackageRecord>, ScanError> {
        self.flush_package()
    }

    fn flush_package(&mut self) -> Result<Option<PackageRecord>, ScanError> {
        self.flush_function()?;
        Ok(self.package.take())
    }

    /// Turn the pending header and running digest into a function record
    fn flush_function(&mut self) -> Result<(), ScanError> {
        let digest = self.hasher.finalize_reset();
        let Some(pending) = self.header.take() else {
            return Ok(());
        };
        let Some(package) = self.package.as_mut() else {
            return Ok(());
        };

        if !header::has_keyword(&pending.line, &self.config.keyword) {
            return Ok(());
        }

        let parsed =
            header::parse_header(&pending.line).map_err(|e| ScanError::MalformedHeader {
                package: package.name.clone(),
                line_number: pending.line_number,
                line: pending.line.clone(),
                reason: e,
            })?;

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&digest);
        let function = FunctionRecord {
            name: parsed.name.to_string(),
            text_size: parsed.size,
            content_hash: ContentHash(hash),
        };
        if package.insert(function).is_some() {
            log::debug!(
                "duplicate function {} in package {}, keeping the last one",
                parsed.name,
                package.name
            );
        }
        Ok(())
    }
}

/// Scan a complete in-memory listing
///
/// # Examples
///
/// ```
/// use compilecmp::scanner::{scan_text, ScannerConfig};
///
/// let listing = "# p\np.f STEXT size=10\n\tRET\n";
/// let packages = scan_text(listing, ScannerConfig::default()).unwrap();
/// assert_eq!(packages[0].functions["p.f"].text_size, 10);
/// ```
pub fn scan_text(text: &str, config: ScannerConfig) -> Result<Vec<PackageRecord>, ScanError> {
    let mut scanner = PackageScanner::new(config);
    let mut packages = Vec::new();
    for line in text.split('\n') {
        if let Some(pkg) = scanner.feed_line(line.as_bytes())? {
            packages.push(pkg);
        }
    }
    if let Some(pkg) = scanner.finish()? {
        packages.push(pkg);
    }
    Ok(packages)
}
