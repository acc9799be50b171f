#![allow(dead_code)]

use anyhow::Result;
use nzmstow::DEFAULT_IGNORE_NAME;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Temporary target plus any number of source trees
pub struct StowFarm {
    pub temp_dir: TempDir,
    pub target: PathBuf,
}

impl StowFarm {
    /// Create an empty target directory inside a fresh temp dir
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let target = temp_dir.path().join("target");
        fs::create_dir_all(&target)?;
        // Canonical so paths compare equal to what the library logs and links
        let target = target.canonicalize()?;
        Ok(Self { temp_dir, target })
    }

    /// Create (or reuse) a source directory `name`
    pub fn source(&self, name: &str) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        fs::create_dir_all(&path)?;
        Ok(path.canonicalize()?)
    }

    /// Write a file below `root`, creating parents
    pub fn write(root: &Path, rel: &str, content: &str) -> Result<PathBuf> {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Write an ignore file with the default name into `dir`
    pub fn ignore(dir: &Path, rules: &str) -> Result<()> {
        Self::write(dir, DEFAULT_IGNORE_NAME, rules)?;
        Ok(())
    }

    /// Relative paths currently under the target
    pub fn target_entries(&self) -> Vec<String> {
        entries(&self.target)
    }
}

/// Sorted relative paths of everything below `root`
pub fn entries(root: &Path) -> Vec<String> {
    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter_map(|e| {
            e.path()
                .strip_prefix(root)
                .ok()
                .map(|p| p.to_string_lossy().into_owned())
        })
        .collect()
}

/// Kind, content or link value, and inode of every entry below `root`
pub fn snapshot(root: &Path) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for entry in WalkDir::new(root).sort_by_file_name().into_iter().filter_map(Result::ok) {
        let path = entry.path();
        let rel = path.strip_prefix(root).unwrap_or(path).to_string_lossy().into_owned();
        let Ok(meta) = fs::symlink_metadata(path) else {
            continue;
        };
        let description = if meta.file_type().is_symlink() {
            format!("link:{}", fs::read_link(path).map(|v| v.display().to_string()).unwrap_or_default())
        } else if meta.is_dir() {
            "dir".to_string()
        } else {
            format!("file:{}:{}", fs::read_to_string(path).unwrap_or_default(), inode(&meta))
        };
        map.insert(rel, description);
    }
    map
}

#[cfg(unix)]
fn inode(meta: &fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    meta.ino()
}

#[cfg(not(unix))]
fn inode(_meta: &fs::Metadata) -> u64 {
    0
}
