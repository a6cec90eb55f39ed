//! Function classification for one matched package

use crate::join::MatchedPair;
use crate::scanner::FunctionRecord;
use crate::sizes::DiffRow;

use super::VisibilityMode;

/// Prefix the compiler gives functions of the package being compiled
const ANONYMOUS_PACKAGE_PREFIX: &str = "\"\".";

/// Strip the anonymous-package qualifier from a function name
pub fn display_name(name: &str) -> &str {
    name.strip_prefix(ANONYMOUS_PACKAGE_PREFIX).unwrap_or(name)
}

/// A reportable difference for one function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionChange {
    /// Only in the before build
    Deleted {
        /// Function name
        name: String,
    },
    /// Only in the after build
    Inserted {
        /// Function name
        name: String,
    },
    /// Body differs, size does not
    ChangedSameSize {
        /// Function name
        name: String,
        /// Text size on both sides
        size: u64,
    },
    /// Body differs and shrank
    ChangedSmaller {
        /// Function name
        name: String,
        /// Text size before
        before: u64,
        /// Text size after
        after: u64,
    },
    /// Body differs and grew
    ChangedBigger {
        /// Function name
        name: String,
        /// Text size before
        before: u64,
        /// Text size after
        after: u64,
    },
}

impl FunctionChange {
    /// Name of the function this change is about
    pub fn name(&self) -> &str {
        match self {
            FunctionChange::Deleted { name }
            | FunctionChange::Inserted { name }
            | FunctionChange::ChangedSameSize { name, .. }
            | FunctionChange::ChangedSmaller { name, .. }
            | FunctionChange::ChangedBigger { name, .. } => name,
        }
    }

    /// True if `mode` lists this change
    pub fn is_visible(&self, mode: VisibilityMode) -> bool {
        match self {
            FunctionChange::Deleted { .. } | FunctionChange::Inserted { .. } => {
                mode.shows_membership()
            }
            FunctionChange::ChangedSameSize { .. } => mode.shows_same_size(),
            FunctionChange::ChangedSmaller { .. } => mode.shows_smaller(),
            FunctionChange::ChangedBigger { .. } => mode.shows_bigger(),
        }
    }
}

/// Classify one function name given its record on each side
///
/// Returns `None` when the function is unchanged (equal content hash) or
/// absent from both sides.
pub fn classify(
    before: Option<&FunctionRecord>,
    after: Option<&FunctionRecord>,
) -> Option<FunctionChange> {
    match (before, after) {
        (Some(b), None) => Some(FunctionChange::Deleted {
            name: b.name.clone(),
        }),
        (None, Some(a)) => Some(FunctionChange::Inserted {
            name: a.name.clone(),
        }),
        (Some(b), Some(a)) if b.same_content(a) => None,
        (Some(b), Some(a)) => {
            let name = b.name.clone();
            Some(if a.text_size == b.text_size {
                FunctionChange::ChangedSameSize {
                    name,
                    size: b.text_size,
                }
            } else if a.text_size < b.text_size {
                FunctionChange::ChangedSmaller {
                    name,
                    before: b.text_size,
                    after: a.text_size,
                }
            } else {
                FunctionChange::ChangedBigger {
                    name,
                    before: b.text_size,
                    after: a.text_size,
                }
            })
        }
        (None, None) => None,
    }
}

/// Result of comparing one matched package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDiff {
    /// Package name
    pub package: String,
    /// Changes the active mode lists, sorted by function name
    pub changes: Vec<FunctionChange>,
    /// Text size totals over every function, listed or not
    pub total: DiffRow,
}

impl PackageDiff {
    /// True if nothing would be printed for this package
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Compares matched packages under a fixed visibility mode
#[derive(Debug, Clone, Copy)]
pub struct DiffReporter {
    mode: VisibilityMode,
}

impl DiffReporter {
    /// Create a reporter for `mode`
    pub fn new(mode: VisibilityMode) -> Self {
        Self { mode }
    }

    /// Classify every function of `pair`
    ///
    /// # Examples
    ///
    /// ```
    /// use compilecmp::diff::{DiffReporter, VisibilityMode};
    /// use compilecmp::join::MatchedPair;
    /// use compilecmp::scanner::{scan_text, ScannerConfig};
    ///
    /// let before = scan_text("# p\np.f STEXT size=10\n\tRET\n", ScannerConfig::default()).unwrap();
    /// let after = scan_text("# p\np.f STEXT size=12\n\tNOP\n\tRET\n", ScannerConfig::default()).unwrap();
    /// let pair = MatchedPair { before: before[0].clone(), after: after[0].clone() };
    ///
    /// let diff = DiffReporter::new(VisibilityMode::Changed).diff(&pair);
    /// assert_eq!(diff.changes.len(), 1);
    /// assert_eq!((diff.total.before, diff.total.after), (10, 12));
    /// ```
    pub fn diff(&self, pair: &MatchedPair) -> PackageDiff {
        let before = &pair.before.functions;
        let after = &pair.after.functions;

        let mut changes: Vec<FunctionChange> = before
            .iter()
            .map(|(name, b)| classify(Some(b), after.get(name)))
            .chain(
                after
                    .iter()
                    .filter(|(name, _)| !before.contains_key(*name))
                    .map(|(_, a)| classify(None, Some(a))),
            )
            .flatten()
            .filter(|change| change.is_visible(self.mode))
            .collect();
        changes.sort_by(|a, b| a.name().cmp(b.name()));

        PackageDiff {
            package: pair.name().to_string(),
            changes,
            total: DiffRow::new(
                pair.name(),
                pair.before.total_text_size(),
                pair.after.total_text_size(),
            ),
        }
    }
}
