/// Linking source trees into a target
pub mod stow;
/// Removing links previously created by stow
pub mod unstow;

use crate::error::{Result, StowError};
use crate::executor::ExecutionReport;
use crate::plan::Collision;
use crate::utils::paths::{make_absolute, same_device};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Default name of per-directory ignore files
pub const DEFAULT_IGNORE_NAME: &str = ".nzmstow-local-ignore";

/// Options shared by [`stow::execute`] and [`unstow::execute`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct StowOptions {
    /// Log every action without touching the filesystem
    pub dry_run: bool,
    /// Stow: clear conflicting targets first. Unstow: remove targets even if
    /// they do not refer to the source
    pub force_remove: bool,
    /// Create hard links instead of symlinks
    pub create_hardlink: bool,
    /// Store absolute paths in symlinks
    pub create_absolute_link: bool,
    /// Replace a differing target with the link
    pub update_target: bool,
    /// Name of the per-directory ignore files
    pub ignore_file_name: String,
    /// Workers for parallel phases, 0 for one per CPU
    pub parallel_threads: usize,
}

impl Default for StowOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            force_remove: false,
            create_hardlink: false,
            create_absolute_link: false,
            update_target: false,
            ignore_file_name: DEFAULT_IGNORE_NAME.to_string(),
            parallel_threads: 0,
        }
    }
}

impl StowOptions {
    /// Check the ignore file name and the roots, returning canonical paths.
    ///
    /// `for_stow` enables the same-device check for hard links.
    ///
    /// # Errors
    ///
    /// Returns [`StowError::Config`] if:
    /// - No source is given or the ignore file name is not a plain name
    /// - The target or a source is not an existing directory
    /// - A source is the target itself
    /// - Hard links are requested across devices
    pub fn validate_roots(
        &self,
        target: &Path,
        sources: &[PathBuf],
        for_stow: bool,
    ) -> Result<(PathBuf, Vec<PathBuf>)> {
        let name = self.ignore_file_name.as_str();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(StowError::config(format!("Invalid ignore file name '{name}'.")));
        }
        if sources.is_empty() {
            return Err(StowError::config("No source directory given."));
        }

        let target = canonical_dir(target, "Target")?;
        let mut canonical = Vec::with_capacity(sources.len());
        for source in sources {
            let source = canonical_dir(source, "Source")?;
            if source == target {
                return Err(StowError::config(format!(
                    "Source directory '{}' and the target directory '{}' are the same.",
                    source.display(),
                    target.display()
                )));
            }
            if for_stow && self.create_hardlink {
                let same = same_device(&source, &target)
                    .map_err(|e| StowError::config(format!("{e:#}")))?;
                if !same {
                    return Err(StowError::config(format!(
                        "Source directory '{}' and the target directory '{}' must be on the same device for hardlink.",
                        source.display(),
                        target.display()
                    )));
                }
            }
            canonical.push(source);
        }

        Ok((target, canonical))
    }
}

/// Absolute, symlink-free form of an existing directory
fn canonical_dir(path: &Path, role: &str) -> Result<PathBuf> {
    let absolute = make_absolute(path).map_err(|e| StowError::config(format!("{e:#}")))?;
    if !absolute.is_dir() {
        return Err(StowError::config(format!(
            "{role} directory '{}' does not exist.",
            absolute.display()
        )));
    }
    absolute.canonicalize().map_err(|e| {
        StowError::config(format!(
            "Failed to resolve {} directory '{}': {e}",
            role.to_lowercase(),
            absolute.display()
        ))
    })
}

/// What a stow or unstow call did
#[derive(Debug, Clone, Default)]
pub struct StowSummary {
    /// Outcome counts over every phase
    pub actions: ExecutionReport,
    /// Overlaps between sources found while planning
    pub collisions: Vec<Collision>,
    /// Whether the run only logged its actions
    pub dry_run: bool,
}

impl StowSummary {
    /// One-line description for the command line
    #[must_use]
    pub fn describe(&self, verb: &str) -> String {
        let a = &self.actions;
        if self.dry_run {
            format!(
                "{verb} (dry run): {} would change, {} already in place, {} skipped",
                a.simulated, a.already_satisfied, a.skipped
            )
        } else {
            format!(
                "{verb}: {} changed, {} already in place, {} skipped",
                a.applied, a.already_satisfied, a.skipped
            )
        }
    }
}

/// Print a success line to stderr
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Print an error line to stderr
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning line to stderr
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}
