//! Visibility modes for the function diff

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which function-level changes are printed
///
/// Package totals are collected in every mode except `Disabled`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityMode {
    /// Everything, including same-size content changes
    All,
    /// Insertions, deletions and size changes
    #[default]
    Changed,
    /// Insertions, deletions and functions that got smaller
    #[value(alias = "better")]
    #[serde(alias = "better")]
    Smaller,
    /// Insertions, deletions and functions that got bigger
    #[value(alias = "worse")]
    #[serde(alias = "worse")]
    Bigger,
    /// No per-function lines, only the size table
    Stats,
    /// Skip the function comparison entirely
    Disabled,
}

impl VisibilityMode {
    /// Every mode, in documentation order
    pub const ALL_MODES: [VisibilityMode; 6] = [
        VisibilityMode::All,
        VisibilityMode::Changed,
        VisibilityMode::Smaller,
        VisibilityMode::Bigger,
        VisibilityMode::Stats,
        VisibilityMode::Disabled,
    ];

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            VisibilityMode::All => "all",
            VisibilityMode::Changed => "changed",
            VisibilityMode::Smaller => "smaller",
            VisibilityMode::Bigger => "bigger",
            VisibilityMode::Stats => "stats",
            VisibilityMode::Disabled => "disabled",
        }
    }

    /// True if inserted and deleted functions are listed
    pub fn shows_membership(&self) -> bool {
        !matches!(self, VisibilityMode::Stats | VisibilityMode::Disabled)
    }

    /// True if content changes without a size change are listed
    pub fn shows_same_size(&self) -> bool {
        matches!(self, VisibilityMode::All)
    }

    /// True if functions that shrank are listed
    pub fn shows_smaller(&self) -> bool {
        matches!(
            self,
            VisibilityMode::All | VisibilityMode::Changed | VisibilityMode::Smaller
        )
    }

    /// True if functions that grew are listed
    pub fn shows_bigger(&self) -> bool {
        matches!(
            self,
            VisibilityMode::All | VisibilityMode::Changed | VisibilityMode::Bigger
        )
    }
}

impl fmt::Display for VisibilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
