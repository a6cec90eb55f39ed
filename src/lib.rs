#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! compilecmp library
//!
//! This library compares the generated code of two compiler builds. It scans
//! assembly listings into packages of functions, joins the packages of both
//! builds by name, and reports inserted, deleted and changed functions along
//! with text size deltas. It can be used programmatically in addition to the
//! CLI interface.
//!
//! # Basic Example
//!
//! Diffing one package scanned from two in-memory listings:
//!
//! ```
//! use compilecmp::diff::{DiffReporter, FunctionChange, VisibilityMode};
//! use compilecmp::join::MatchedPair;
//! use compilecmp::scanner::{scan_text, ScannerConfig};
//!
//! let before = scan_text("# p\np.f STEXT size=8\n\tRET\n", ScannerConfig::default())?;
//! let after = scan_text("# p\np.f STEXT size=6\n\tNOP\n", ScannerConfig::default())?;
//!
//! let pair = MatchedPair {
//!     before: before.into_iter().next().unwrap(),
//!     after: after.into_iter().next().unwrap(),
//! };
//! let diff = DiffReporter::new(VisibilityMode::Changed).diff(&pair);
//!
//! assert!(matches!(
//!     diff.changes[0],
//!     FunctionChange::ChangedSmaller { before: 8, after: 6, .. }
//! ));
//! assert_eq!(diff.total.after, 6);
//! # Ok::<(), compilecmp::scanner::ScanError>(())
//! ```
//!
//! # Advanced Example: Size Tables
//!
//! ```
//! use compilecmp::sizes::SizeAggregator;
//!
//! let mut sizes = SizeAggregator::new("file");
//! sizes.add("fmt.a", 1000, 1100);
//! sizes.add("gone.a", 300, 0);
//!
//! let table = sizes.render();
//! assert!(table.contains("+10.000%"));
//! assert!(!table.contains("gone.a"));
//! ```

/// Command-line interface definition
pub mod cli;
/// Command handlers for CLI operations
pub mod cmd;
/// Configuration file loading
pub mod config;
/// Function classification and report rendering
pub mod diff;
/// Enhanced error types with contextual suggestions
pub mod error;
/// Shared formatting utilities
pub mod fmt;
/// Git ref resolution
pub mod git;
/// Infrastructure traits for filesystem and command execution
pub mod infra;
/// Merge join of two package streams
pub mod join;
/// Assembly listing scanner
pub mod scanner;
/// Size tables
pub mod sizes;
/// Listing sources and producer tasks
pub mod source;
