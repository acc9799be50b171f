//! Folding the rules of every ignore file below a root into one excluded set.
//!
//! Ignore files are visited outermost first. A rule adds every path its
//! pattern matches; a negated rule removes matched paths again, but only
//! those with no excluded ancestor. An ignore file inside an excluded
//! directory is never read. Once every file is processed, excluded
//! directories are expanded so that everything below them is excluded too.

use super::glob::{GlobMatcher, GlobOptions};
use super::rules::{IgnoreRule, escape, parse_rules};
use crate::error::{Result, StowError};
use crate::utils::normalize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Options every ignore pattern is matched with
const IGNORE_GLOB: GlobOptions = GlobOptions {
    recursive: true,
    include_hidden: true,
    follow_symlinks: false,
};

/// Paths excluded from a scan, relative to the scan root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    /// Normalized relative paths; never contains the empty path
    paths: HashSet<PathBuf>,
}

impl IgnoreSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `rel` (relative to the scan root) is excluded
    #[must_use]
    pub fn contains(&self, rel: &Path) -> bool {
        self.paths.contains(rel)
    }

    /// Number of excluded paths
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether nothing is excluded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterate over excluded paths in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    /// Add every path of `other` to this set
    pub fn extend(&mut self, other: Self) {
        self.paths.extend(other.paths);
    }

    /// Whether some proper ancestor of `rel` is excluded
    #[must_use]
    pub fn has_excluded_ancestor(&self, rel: &Path) -> bool {
        rel.ancestors()
            .skip(1)
            .filter(|a| !a.as_os_str().is_empty())
            .any(|a| self.paths.contains(a))
    }

    /// Add a path, normalizing it first. The root itself is never added.
    fn insert(&mut self, rel: &Path) {
        let rel = normalize(rel);
        if !rel.as_os_str().is_empty() {
            self.paths.insert(rel);
        }
    }

    /// Remove a path unless one of its ancestors is excluded
    fn remove_unless_shadowed(&mut self, rel: &Path) {
        if !self.has_excluded_ancestor(rel) {
            self.paths.remove(rel);
        }
    }
}

impl FromIterator<PathBuf> for IgnoreSet {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        let mut set = Self::new();
        for path in iter {
            set.insert(&path);
        }
        set
    }
}

/// Resolve the ignore files named `file_name` for the tree under `root`.
///
/// Patterns are matched against `root`, while the ignore files themselves
/// are looked up at the same relative location under `ignore_root`. Passing
/// the same directory twice reads the files inside the tree; passing the
/// target tree as `ignore_root` picks up ignore files pre-staged there.
///
/// # Errors
///
/// Returns an error if an existing ignore file cannot be read
pub fn resolve(root: &Path, ignore_root: &Path, file_name: &str) -> Result<IgnoreSet> {
    let mut excluded = IgnoreSet::new();

    let mut walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let Ok(entry) = entry else {
            continue;
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let rel = rel.to_path_buf();
        if excluded.contains(&rel) || excluded.has_excluded_ancestor(&rel) {
            walker.skip_current_dir();
            continue;
        }

        let ignore_file = ignore_root.join(&rel).join(file_name);
        if !fs::symlink_metadata(&ignore_file).is_ok_and(|m| m.is_file()) {
            continue;
        }

        let rules = read_rules(&ignore_file, &rel, file_name)?;
        debug!("ignore:read:{} ({} rules)", ignore_file.display(), rules.len());
        for rule in &rules {
            apply_rule(root, rule, &mut excluded);
        }
    }

    close_directories(root, &mut excluded);
    Ok(excluded)
}

/// Rules appended to every ignore file after its own lines
const IMPLICIT_RULES: &[&str] = &[".git"];

/// Read one ignore file and append the implicit rules plus the rule
/// excluding the file itself
fn read_rules(path: &Path, rel: &Path, file_name: &str) -> Result<Vec<IgnoreRule>> {
    let bytes = fs::read(path).map_err(|e| StowError::io("read", path, e))?;
    let content = String::from_utf8_lossy(&bytes);
    let own = format!("/{}", escape(file_name));
    let lines = content
        .split_inclusive('\n')
        .chain(IMPLICIT_RULES.iter().copied())
        .chain(std::iter::once(own.as_str()));
    Ok(parse_rules(lines, rel))
}

/// Apply one rule to the working set
fn apply_rule(root: &Path, rule: &IgnoreRule, excluded: &mut IgnoreSet) {
    let matcher = match GlobMatcher::new(&rule.pattern, IGNORE_GLOB) {
        Ok(m) => m,
        Err(e) => {
            debug!("ignore:skip:{}: {e}", rule.pattern);
            return;
        }
    };

    let mut found: Vec<PathBuf> = matcher.matches(root).map(|p| normalize(&p)).collect();
    if rule.negate {
        found.sort();
        for path in &found {
            excluded.remove_unless_shadowed(path);
        }
    } else {
        for path in &found {
            excluded.insert(path);
        }
    }
}

/// Exclude everything below each excluded directory
fn close_directories(root: &Path, excluded: &mut IgnoreSet) {
    let dirs: Vec<PathBuf> = excluded
        .iter()
        .filter(|rel| fs::symlink_metadata(root.join(rel)).is_ok_and(|m| m.is_dir()))
        .map(Path::to_path_buf)
        .collect();

    for dir in dirs {
        for entry in WalkDir::new(root.join(&dir))
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(std::result::Result::ok)
        {
            if let Ok(rel) = entry.path().strip_prefix(root) {
                excluded.insert(rel);
            }
        }
    }
}
