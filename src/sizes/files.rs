//! File size collection for directory trees

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use crate::infra::FileSystem;

use super::SizeAggregator;

/// Sizes of every regular file under `root`, keyed by `/`-separated
/// relative path
///
/// With `extension` set, only files with that extension (without the dot)
/// are collected.
pub fn collect_file_sizes<FS: FileSystem>(
    fs: &FS,
    root: &Path,
    extension: Option<&str>,
) -> io::Result<BTreeMap<String, u64>> {
    let mut sizes = BTreeMap::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for path in fs.list_dir(&dir)? {
            if fs.is_dir(&path) {
                pending.push(path);
                continue;
            }
            if let Some(ext) = extension {
                if path.extension().and_then(|e| e.to_str()) != Some(ext) {
                    continue;
                }
            }
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            sizes.insert(key, fs.file_size(&path)?);
        }
    }

    log::debug!("collected {} files under {}", sizes.len(), root.display());
    Ok(sizes)
}

/// Compare the file sizes of two directory trees
///
/// Files missing on one side count as size zero and are therefore left out
/// of the table.
pub fn compare_dirs<FS: FileSystem>(
    fs: &FS,
    before: &Path,
    after: &Path,
    extension: Option<&str>,
) -> io::Result<SizeAggregator> {
    let before_sizes = collect_file_sizes(fs, before, extension)?;
    let mut after_sizes = collect_file_sizes(fs, after, extension)?;

    let mut aggregator = SizeAggregator::new("file");
    for (name, before_size) in before_sizes {
        let after_size = after_sizes.remove(&name).unwrap_or(0);
        aggregator.add(name, before_size, after_size);
    }
    for name in after_sizes.keys() {
        log::debug!("{} only exists in {}", name, after.display());
    }
    Ok(aggregator)
}
