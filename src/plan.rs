//! Merging per-source scans into one link plan for a target root.
//!
//! Sources are processed in caller order. Each one gets its own ignore set,
//! resolved from ignore files inside the source and from ignore files
//! pre-staged at the mirrored location under the target. When two sources
//! claim the same target path the later one wins and a collision is
//! recorded.

use crate::error::Result;
use crate::ignore::resolve;
use crate::scanner::TreeScanner;
use crate::utils::normalize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What kind of overlap a collision is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    /// Two sources provide a file at the same target path
    File,
    /// One source provides a directory where another provides a file
    DirectoryFile,
}

/// A target path populated by more than one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    /// Contested target path
    pub target: PathBuf,
    /// Entry from the earlier source
    pub earlier: PathBuf,
    /// Entry from the later source
    pub later: PathBuf,
    /// Overlap kind
    pub kind: CollisionKind,
}

/// One source file to be linked at one target path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLink {
    /// Entry inside a source tree
    pub source: PathBuf,
    /// Path inside the target tree
    pub target: PathBuf,
    /// Index of the source root this entry came from
    pub origin: usize,
}

/// Directories and links for one stow or unstow call
#[derive(Debug, Clone, Default)]
pub struct Plan {
    /// Target root every path below is inside of
    pub target_root: PathBuf,
    /// Source roots in caller order, duplicates removed
    pub sources: Vec<PathBuf>,
    /// Target directories, parents before children
    pub target_dirs: Vec<PathBuf>,
    /// Links grouped by source in caller order
    pub links: Vec<FileLink>,
    /// Every source entry with its target, shadowed ones included
    pub claims: Vec<FileLink>,
    /// Every overlap between sources
    pub collisions: Vec<Collision>,
}

impl Plan {
    /// Scan every source against `target_root` and merge the results.
    ///
    /// # Errors
    ///
    /// Returns an error if an ignore file exists but cannot be read
    pub fn build(target_root: &Path, sources: &[PathBuf], ignore_file_name: &str) -> Result<Self> {
        let target_root = normalize(target_root);
        let sources = dedup_sources(sources);

        let mut target_dirs = Vec::new();
        let mut seen_dirs = HashSet::new();
        let mut dir_origin: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();
        let mut merged: BTreeMap<PathBuf, (usize, PathBuf)> = BTreeMap::new();
        let mut collisions = Vec::new();
        let mut claims = Vec::new();

        for (origin, source) in sources.iter().enumerate() {
            let mut ignore = resolve(source, source, ignore_file_name)?;
            ignore.extend(resolve(source, &target_root, ignore_file_name)?);
            debug!("plan:{}: {} ignored", source.display(), ignore.len());

            let scan = TreeScanner::new(source, &target_root, &ignore).scan();

            for dir in scan.target_dirs {
                if seen_dirs.insert(dir.clone()) {
                    if let Ok(rel) = dir.strip_prefix(&target_root) {
                        dir_origin.insert(dir.clone(), source.join(rel));
                    }
                    target_dirs.push(dir);
                }
            }

            for (target, entry) in scan.file_map {
                claims.push(FileLink {
                    source: entry.clone(),
                    target: target.clone(),
                    origin,
                });
                if let Some((_, earlier)) = merged.get(&target) {
                    warn!("overlap:({}, {})", earlier.display(), entry.display());
                    collisions.push(Collision {
                        target: target.clone(),
                        earlier: earlier.clone(),
                        later: entry.clone(),
                        kind: CollisionKind::File,
                    });
                }
                merged.insert(target, (origin, entry));
            }
        }

        // A path cannot be both a directory and a link; the directory stays.
        merged.retain(|target, (_, entry)| {
            let Some(dir_source) = dir_origin.get(target) else {
                return true;
            };
            warn!("overlap:({}, {})", dir_source.display(), entry.display());
            collisions.push(Collision {
                target: target.clone(),
                earlier: dir_source.clone(),
                later: entry.clone(),
                kind: CollisionKind::DirectoryFile,
            });
            false
        });

        let mut links: Vec<FileLink> = merged
            .into_iter()
            .map(|(target, (origin, source))| FileLink {
                source,
                target,
                origin,
            })
            .collect();
        links.sort_by_key(|link| link.origin);

        Ok(Self {
            target_root,
            sources,
            target_dirs,
            links,
            claims,
            collisions,
        })
    }

    /// Links in the order they are created: sources in caller order
    pub fn stow_links(&self) -> impl Iterator<Item = &FileLink> {
        self.links.iter()
    }

    /// Every claim in the order it is removed: the last source first.
    ///
    /// A contested target appears once per source that provides it.
    pub fn unstow_links(&self) -> impl Iterator<Item = &FileLink> {
        let mut ordered: Vec<&FileLink> = self.claims.iter().collect();
        ordered.sort_by_key(|link| std::cmp::Reverse(link.origin));
        ordered.into_iter()
    }

    /// Directories deepest first, the order they are removed in
    pub fn unstow_dirs(&self) -> impl Iterator<Item = &PathBuf> {
        self.target_dirs.iter().rev()
    }
}

/// Normalize sources and drop repeats, keeping first occurrences
fn dedup_sources(sources: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    sources
        .iter()
        .map(|s| normalize(s))
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
