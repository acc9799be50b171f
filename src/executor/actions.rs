use crate::error::{Result, StowError};
use crate::utils::links_to;
use crate::utils::paths::symlink_value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// How a target link is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Hard link, source and target must share a device
    Hard,
    /// Symbolic link, relative to the link's directory unless `absolute`
    Soft {
        /// Store the absolute source path instead of a relative one
        absolute: bool,
    },
}

/// When a remove action actually deletes its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveMode {
    /// Remove whatever non-directory is there
    Force,
    /// Remove only if the target already refers to the source
    IfLinked,
    /// Remove only if the target does not already refer to the source
    UnlessLinked,
}

/// Outcome of one applied action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The filesystem was changed
    Applied,
    /// The filesystem already had the desired shape
    AlreadySatisfied,
    /// A non-fatal conflict left the target untouched
    Skipped,
    /// Dry run: the change was logged only
    Simulated,
}

/// One filesystem mutation planned against the target tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    /// Create a directory; its parent already exists
    MakeDir(PathBuf),
    /// Link `target` to `source`
    Link {
        /// Entry inside a source tree
        source: PathBuf,
        /// Path inside the target tree
        target: PathBuf,
        /// Hard or symbolic
        kind: LinkKind,
        /// Replace a differing non-directory at `target`
        replace: bool,
    },
    /// Remove the non-directory at `target`
    Remove {
        /// Entry `target` is compared against
        source: PathBuf,
        /// Path inside the target tree
        target: PathBuf,
        /// Removal condition
        mode: RemoveMode,
    },
    /// Remove `target` if it is an empty directory
    RemoveDir(PathBuf),
}

impl LinkAction {
    /// Apply the action, or only log it when `dry_run` is set.
    ///
    /// Read-only checks still run in dry-run mode, so the log reflects what
    /// a real run would do.
    ///
    /// # Errors
    ///
    /// Returns [`StowError::Io`] for any OS failure not treated as success
    pub fn apply(&self, dry_run: bool) -> Result<Outcome> {
        match self {
            Self::MakeDir(path) => make_dir(path, dry_run),
            Self::Link {
                source,
                target,
                kind,
                replace,
            } => link(source, target, *kind, *replace, dry_run),
            Self::Remove {
                source,
                target,
                mode,
            } => remove(source, target, *mode, dry_run),
            Self::RemoveDir(path) => remove_dir(path, dry_run),
        }
    }
}

/// Log a fatal failure and turn it into an error
fn fatal(op: &'static str, path: &Path, e: io::Error) -> StowError {
    error!("failed:{op}:{}: {e}", path.display());
    StowError::io(op, path, e)
}

fn make_dir(path: &Path, dry_run: bool) -> Result<Outcome> {
    match fs::symlink_metadata(path) {
        Ok(m) if m.is_dir() => {
            debug!("mkdir:{}: exists", path.display());
            return Ok(Outcome::AlreadySatisfied);
        }
        Ok(_) => {
            warn!("mkdir:{}: exists and is not a directory", path.display());
            return Ok(Outcome::Skipped);
        }
        Err(_) => {}
    }

    info!("mkdir:{}", path.display());
    if dry_run {
        return Ok(Outcome::Simulated);
    }

    match fs::create_dir(path) {
        Ok(()) => Ok(Outcome::Applied),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            if fs::symlink_metadata(path).is_ok_and(|m| m.is_dir()) {
                Ok(Outcome::AlreadySatisfied)
            } else {
                warn!("mkdir:{}: exists and is not a directory", path.display());
                Ok(Outcome::Skipped)
            }
        }
        Err(e) => Err(fatal("mkdir", path, e)),
    }
}

fn link(source: &Path, target: &Path, kind: LinkKind, replace: bool, dry_run: bool) -> Result<Outcome> {
    if links_to(target, source) {
        debug!("link:{}: already linked", target.display());
        return Ok(Outcome::AlreadySatisfied);
    }

    if let Ok(existing) = fs::symlink_metadata(target) {
        if existing.is_dir() {
            warn!("link:{}: target exists and is a directory", target.display());
            return Ok(Outcome::Skipped);
        }
        if !replace {
            warn!(
                "link:{}: target exists and differs from {}",
                target.display(),
                source.display()
            );
            return Ok(Outcome::Skipped);
        }
        info!("update:{}", target.display());
        if !dry_run {
            match fs::remove_file(target) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(fatal("remove", target, e)),
            }
        }
    }

    let (op, created) = match kind {
        LinkKind::Hard => {
            info!("link:{}", target.display());
            if dry_run {
                return Ok(Outcome::Simulated);
            }
            ("link", fs::hard_link(source, target))
        }
        LinkKind::Soft { absolute } => {
            let value = symlink_value(source, target, absolute);
            info!("symlink:{} -> {}", target.display(), value.display());
            if dry_run {
                return Ok(Outcome::Simulated);
            }
            ("symlink", make_symlink(&value, target))
        }
    };

    match created {
        Ok(()) => Ok(Outcome::Applied),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            if links_to(target, source) {
                Ok(Outcome::AlreadySatisfied)
            } else {
                warn!("{op}:{}: target appeared concurrently", target.display());
                Ok(Outcome::Skipped)
            }
        }
        Err(e) => Err(fatal(op, target, e)),
    }
}

#[cfg(unix)]
fn make_symlink(value: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(value, target)
}

#[cfg(windows)]
fn make_symlink(value: &Path, target: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(value, target)
}

fn remove(source: &Path, target: &Path, mode: RemoveMode, dry_run: bool) -> Result<Outcome> {
    let Ok(existing) = fs::symlink_metadata(target) else {
        debug!("remove:{}: already absent", target.display());
        return Ok(Outcome::AlreadySatisfied);
    };
    if existing.is_dir() {
        debug!("remove:{}: is a directory", target.display());
        return Ok(Outcome::AlreadySatisfied);
    }

    match mode {
        RemoveMode::Force => {}
        RemoveMode::IfLinked => {
            if !links_to(target, source) {
                debug!(
                    "skip:remove:{}: does not refer to {}",
                    target.display(),
                    source.display()
                );
                return Ok(Outcome::Skipped);
            }
        }
        RemoveMode::UnlessLinked => {
            if links_to(target, source) {
                debug!("remove:{}: already linked, kept", target.display());
                return Ok(Outcome::AlreadySatisfied);
            }
        }
    }

    info!("remove:{}", target.display());
    if dry_run {
        return Ok(Outcome::Simulated);
    }

    match fs::remove_file(target) {
        Ok(()) => Ok(Outcome::Applied),
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::IsADirectory) => {
            Ok(Outcome::AlreadySatisfied)
        }
        Err(e) => Err(fatal("remove", target, e)),
    }
}

fn remove_dir(path: &Path, dry_run: bool) -> Result<Outcome> {
    let Ok(existing) = fs::symlink_metadata(path) else {
        debug!("rmdir:{}: already absent", path.display());
        return Ok(Outcome::AlreadySatisfied);
    };
    if !existing.is_dir() {
        debug!("skip:rmdir:{}: not a directory", path.display());
        return Ok(Outcome::Skipped);
    }

    let mut entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Outcome::AlreadySatisfied),
        Err(e) => return Err(fatal("rmdir", path, e)),
    };
    if entries.next().is_some() {
        debug!("skip:rmdir:{}: not empty", path.display());
        return Ok(Outcome::Skipped);
    }

    info!("rmdir:{}", path.display());
    if dry_run {
        return Ok(Outcome::Simulated);
    }

    match fs::remove_dir(path) {
        Ok(()) => Ok(Outcome::Applied),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Outcome::AlreadySatisfied),
        Err(e) if e.kind() == io::ErrorKind::DirectoryNotEmpty => {
            debug!("skip:rmdir:{}: not empty", path.display());
            Ok(Outcome::Skipped)
        }
        Err(e) => Err(fatal("rmdir", path, e)),
    }
}
