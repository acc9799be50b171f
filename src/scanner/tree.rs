use crate::ignore::IgnoreSet;
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directories and leaf associations found under one source root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Target directories to create, parents before children
    pub target_dirs: Vec<PathBuf>,
    /// Target path -> source path for every linkable leaf
    pub file_map: BTreeMap<PathBuf, PathBuf>,
}

/// Breadth-first scanner projecting one source tree onto a target root
pub struct TreeScanner<'a> {
    /// Tree being projected
    source_root: &'a Path,
    /// Tree receiving the links
    target_root: &'a Path,
    /// Source-relative paths to leave out
    ignore: &'a IgnoreSet,
}

impl<'a> TreeScanner<'a> {
    /// Create a scanner for `source_root` projected onto `target_root`
    #[must_use]
    pub const fn new(source_root: &'a Path, target_root: &'a Path, ignore: &'a IgnoreSet) -> Self {
        Self {
            source_root,
            target_root,
            ignore,
        }
    }

    /// Walk the source tree.
    ///
    /// Real directories are recorded and descended into; files and symlinks
    /// (including symlinks to directories) become leaves. Excluded entries
    /// are skipped together with their subtree. Entries that vanish or
    /// cannot be stat'ed, and directories that cannot be listed, are logged
    /// and skipped.
    #[must_use]
    pub fn scan(&self) -> ScanResult {
        let mut result = ScanResult::default();
        let mut queue = VecDeque::from([self.source_root.to_path_buf()]);

        while let Some(dir) = queue.pop_front() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("scan:{}: {e}", dir.display());
                    continue;
                }
            };
            let mut entries: Vec<_> = entries.filter_map(Result::ok).collect();
            entries.sort_by_key(fs::DirEntry::file_name);

            for entry in entries {
                let source = entry.path();
                let Ok(rel) = source.strip_prefix(self.source_root) else {
                    continue;
                };
                if self.ignore.contains(rel) {
                    debug!("scan:ignored:{}", rel.display());
                    continue;
                }

                // DirEntry::metadata does not traverse symlinks
                let metadata = match entry.metadata() {
                    Ok(m) => m,
                    Err(e) => {
                        warn!("scan:{}: {e}", source.display());
                        continue;
                    }
                };

                let target = self.target_root.join(rel);
                if metadata.is_dir() {
                    result.target_dirs.push(target);
                    queue.push_back(source);
                } else {
                    result.file_map.insert(target, source);
                }
            }
        }

        result
    }
}
