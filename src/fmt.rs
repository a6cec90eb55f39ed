//! Shared formatting utilities for report output

use console::Style;
use serde::{Deserialize, Serialize};

/// When to emit ANSI colors
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Color when stdout is a terminal
    #[default]
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

/// Report styling, resolved once per run
///
/// Styles are applied with `force_styling` so the decision made here is the
/// only one; a disabled palette returns text unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    /// Palette that styles only if `enabled`
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Palette without any styling
    pub fn plain() -> Self {
        Self::new(false)
    }

    /// Resolve a [`ColorChoice`] against the current stdout
    pub fn from_choice(choice: ColorChoice) -> Self {
        match choice {
            ColorChoice::Always => Self::new(true),
            ColorChoice::Never => Self::plain(),
            ColorChoice::Auto => Self::new(console::colors_enabled()),
        }
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.enabled {
            style.force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Package header
    pub fn header(&self, text: &str) -> String {
        self.paint(Style::new().yellow().bold(), text)
    }

    /// Content changed without a size change
    pub fn changed(&self, text: &str) -> String {
        self.paint(Style::new().cyan(), text)
    }

    /// Size went down
    pub fn smaller(&self, text: &str) -> String {
        self.paint(Style::new().green(), text)
    }

    /// Size went up
    pub fn bigger(&self, text: &str) -> String {
        self.paint(Style::new().red(), text)
    }

    /// Informational side notes
    pub fn dim(&self, text: &str) -> String {
        self.paint(Style::new().dim(), text)
    }
}

/// Signed percentage change from `before` to `after`
///
/// # Examples
///
/// ```
/// use compilecmp::fmt::percent_change;
///
/// assert_eq!(percent_change(200, 250), 25.0);
/// assert_eq!(percent_change(100, 50), -50.0);
/// ```
pub fn percent_change(before: u64, after: u64) -> f64 {
    100.0 * after as f64 / before as f64 - 100.0
}

/// Format a signed percentage with three decimals, e.g. `+1.500%`
pub fn format_percent(percent: f64) -> String {
    format!("{:+.3}%", percent)
}

/// Format a signed byte delta, e.g. `+12` or `-3`
pub fn format_delta(before: u64, after: u64) -> String {
    format!("{:+}", after as i128 - before as i128)
}
