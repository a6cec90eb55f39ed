//! Per-function and per-package records produced by the scanner

use std::collections::BTreeMap;
use std::fmt;

/// SHA-256 digest of a function's normalized body
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(pub [u8; 32]);

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The first eight bytes are plenty to tell digests apart in test output
        for byte in &self.0[..8] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// One compiled function within one package snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRecord {
    /// Symbol name, unique within its package
    pub name: String,
    /// Instruction byte count of the compiled body
    pub text_size: u64,
    /// Digest over the normalized body lines
    pub content_hash: ContentHash,
}

impl FunctionRecord {
    /// Two records with the same digest are behaviorally identical
    pub fn same_content(&self, other: &FunctionRecord) -> bool {
        self.content_hash == other.content_hash
    }
}

/// One compilation unit's snapshot from one side of the comparison
///
/// Functions are kept in a `BTreeMap` so that iteration (and therefore
/// report output) is ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageRecord {
    /// Package identifier taken from the `# <name>` marker
    pub name: String,
    /// Functions keyed by name
    pub functions: BTreeMap<String, FunctionRecord>,
}

impl PackageRecord {
    /// Create an empty package
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: BTreeMap::new(),
        }
    }

    /// Insert a function, returning the record it replaced (if any)
    pub fn insert(&mut self, function: FunctionRecord) -> Option<FunctionRecord> {
        self.functions.insert(function.name.clone(), function)
    }

    /// Sum of text sizes of every function in the package
    pub fn total_text_size(&self) -> u64 {
        self.functions.values().map(|f| f.text_size).sum()
    }
}

/// Which build a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The baseline build
    Before,
    /// The build under test
    After,
}

impl Side {
    /// The opposite side
    pub fn other(self) -> Side {
        match self {
            Side::Before => Side::After,
            Side::After => Side::Before,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Before => f.write_str("before"),
            Side::After => f.write_str("after"),
        }
    }
}
