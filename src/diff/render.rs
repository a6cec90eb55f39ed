//! Text rendering of package diffs

use crate::fmt::Palette;

use super::reporter::{display_name, FunctionChange, PackageDiff};

/// Render one function change as a single report line
pub fn render_change(change: &FunctionChange, palette: &Palette) -> String {
    match change {
        FunctionChange::Deleted { name } => format!("DELETED {}", display_name(name)),
        FunctionChange::Inserted { name } => format!("INSERTED {}", display_name(name)),
        FunctionChange::ChangedSameSize { name, .. } => {
            palette.changed(&format!("{} changed", display_name(name)))
        }
        FunctionChange::ChangedSmaller {
            name,
            before,
            after,
        } => palette.smaller(&format!("{} {} -> {}", display_name(name), before, after)),
        FunctionChange::ChangedBigger {
            name,
            before,
            after,
        } => palette.bigger(&format!("{} {} -> {}", display_name(name), before, after)),
    }
}

/// Render a package diff
///
/// The header (a blank line, then the package name) is only emitted when
/// the package has at least one listed change; otherwise the result is
/// empty.
pub fn render_package(diff: &PackageDiff, palette: &Palette) -> String {
    if diff.is_empty() {
        return String::new();
    }

    let mut out = format!("\n{}\n", palette.header(&diff.package));
    for change in &diff.changes {
        out.push_str(&render_change(change, palette));
        out.push('\n');
    }
    out
}
