//! Size delta aggregation
//!
//! [`SizeAggregator`] collects `(label, before, after)` rows and renders a
//! column-aligned table with signed deltas and percentages. It backs both
//! the per-package text size summary of `funcs` and the plain file size
//! comparison of `sizes`.

pub mod files;

pub use files::{collect_file_sizes, compare_dirs};

use std::io::{self, Write};

use crate::fmt::{format_delta, format_percent, percent_change};

/// Minimum column width, matching an 8-column tab stop
const MIN_CELL_WIDTH: usize = 8;
/// Spaces after the widest cell of each column
const CELL_PADDING: usize = 1;

/// One labelled before/after size pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRow {
    /// Row label (package or file name)
    pub label: String,
    /// Size in the before build
    pub before: u64,
    /// Size in the after build
    pub after: u64,
}

impl DiffRow {
    /// Create a row
    pub fn new(label: impl Into<String>, before: u64, after: u64) -> Self {
        Self {
            label: label.into(),
            before,
            after,
        }
    }

    /// Signed percentage change
    pub fn percent(&self) -> f64 {
        percent_change(self.before, self.after)
    }
}

/// Accumulates rows and renders the delta table
#[derive(Debug, Clone)]
pub struct SizeAggregator {
    description: String,
    rows: Vec<DiffRow>,
    total_before: u64,
    total_after: u64,
}

impl SizeAggregator {
    /// Create an aggregator; `description` names the measured thing in the
    /// "no changes" message
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            rows: Vec::new(),
            total_before: 0,
            total_after: 0,
        }
    }

    /// Record one row
    ///
    /// Rows with a zero on either side are dropped; rows without a change
    /// count toward the totals but are not listed.
    pub fn add(&mut self, label: impl Into<String>, before: u64, after: u64) {
        if before == 0 || after == 0 {
            return;
        }
        self.total_before += before;
        self.total_after += after;
        if before != after {
            self.rows.push(DiffRow::new(label, before, after));
        }
    }

    /// Record a prepared row
    pub fn add_row(&mut self, row: DiffRow) {
        self.add(row.label, row.before, row.after);
    }

    /// True if at least one row differed
    pub fn has_changes(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Totals over every accepted row, changed or not
    pub fn total(&self) -> DiffRow {
        DiffRow::new("total", self.total_before, self.total_after)
    }

    /// Render the table, or the "no changes" line
    ///
    /// # Examples
    ///
    /// ```
    /// use compilecmp::sizes::SizeAggregator;
    ///
    /// let mut sizes = SizeAggregator::new("text size");
    /// sizes.add("same", 5, 5);
    /// assert_eq!(sizes.render(), "no text size size changes\n");
    ///
    /// sizes.add("grew", 10, 15);
    /// assert!(sizes.render().contains("+50.000%"));
    /// ```
    pub fn render(&self) -> String {
        if !self.has_changes() {
            return format!("no {} size changes\n", self.description);
        }

        let mut table: Vec<[String; 5]> = Vec::with_capacity(self.rows.len() + 2);
        table.push([
            "file".to_string(),
            "before".to_string(),
            "after".to_string(),
            "Δ".to_string(),
            "%".to_string(),
        ]);
        for row in self.rows.iter().chain(std::iter::once(&self.total())) {
            table.push([
                row.label.clone(),
                row.before.to_string(),
                row.after.to_string(),
                format_delta(row.before, row.after),
                format_percent(row.percent()),
            ]);
        }

        let mut widths = [MIN_CELL_WIDTH; 5];
        for cells in &table {
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(console::measure_text_width(cell) + CELL_PADDING);
            }
        }

        let mut out = String::new();
        for cells in &table {
            for (width, cell) in widths.iter().zip(cells) {
                out.push_str(cell);
                let pad = width - console::measure_text_width(cell);
                out.extend(std::iter::repeat_n(' ', pad));
            }
            out.push('\n');
        }
        out
    }

    /// Write the rendered table to `w`
    pub fn flush(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_all(self.render().as_bytes())
    }
}
