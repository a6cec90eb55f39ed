//! Function-level diff of matched packages
//!
//! [`DiffReporter`] classifies every function of a [`MatchedPair`] and keeps
//! the changes the active [`VisibilityMode`] lists, plus the package's text
//! size totals. Rendering is separate so callers can buffer and sort
//! packages before printing.
//!
//! [`MatchedPair`]: crate::join::MatchedPair

pub mod mode;
pub mod render;
pub mod reporter;

pub use mode::VisibilityMode;
pub use render::{render_change, render_package};
pub use reporter::{classify, display_name, DiffReporter, FunctionChange, PackageDiff};
