//! Sizes command implementation
//!
//! Handles the `compilecmp sizes` command, which compares the sizes of the
//! files two builds left in their output directories.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::error::CompileCmpError;
use crate::infra::{FileSystem, RealFileSystem};
use crate::sizes::{compare_dirs, SizeAggregator};

/// Compare two build output directories and print the size table
///
/// # Examples
///
/// ```no_run
/// use compilecmp::cmd::sizes::cmd_sizes;
/// use std::path::Path;
///
/// cmd_sizes(Path::new("old/pkg"), Path::new("new/pkg"), Some("a"))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if either directory doesn't exist or can't be walked.
pub fn cmd_sizes(before: &Path, after: &Path, extension: Option<&str>) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    cmd_sizes_impl(&RealFileSystem, before, after, extension, &mut out)?;
    Ok(())
}

/// Implementation over an injected filesystem and writer
pub fn cmd_sizes_impl<FS: FileSystem, W: Write>(
    fs: &FS,
    before: &Path,
    after: &Path,
    extension: Option<&str>,
    out: &mut W,
) -> Result<SizeAggregator> {
    for dir in [before, after] {
        if !fs.is_dir(dir) {
            return Err(CompileCmpError::FileNotFound {
                path: dir.to_path_buf(),
            }
            .into());
        }
    }

    let extension = extension.map(|ext| ext.trim_start_matches('.'));
    let sizes = compare_dirs(fs, before, after, extension).map_err(|source| {
        CompileCmpError::Io {
            context: format!(
                "walking {} and {}",
                before.display(),
                after.display()
            ),
            source,
        }
    })?;

    sizes.flush(out).context("Failed to write size table")?;
    Ok(sizes)
}
