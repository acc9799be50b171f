//! Error type shared by planning and execution.
//!
//! Only two things abort a run: a configuration problem detected before any
//! filesystem mutation, or an unexpected OS failure while applying an action.
//! Everything else (already linked, directory not empty, target replaced by
//! the user) is logged and treated as success by the executor.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Errors raised by [`crate::stow`] and [`crate::unstow`]
#[derive(Debug)]
pub enum StowError {
    /// Invalid roots or options, detected before planning
    Config(String),
    /// Fatal filesystem failure while applying an action
    Io {
        /// Short action name (`mkdir`, `link`, `symlink`, `remove`, `rmdir`, `read`)
        op: &'static str,
        /// Path the action was applied to
        path: PathBuf,
        /// Underlying OS error
        source: io::Error,
    },
    /// The worker pool could not be created
    WorkerPool(String),
}

impl StowError {
    /// Build a configuration error from any displayable message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap an OS error raised while running `op` on `path`
    pub fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether this error was raised before any filesystem mutation
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl fmt::Display for StowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "{msg}"),
            Self::Io { op, path, source } => {
                write!(f, "failed:{op}:{}: {source}", path.display())
            }
            Self::WorkerPool(msg) => write!(f, "worker pool: {msg}"),
        }
    }
}

impl std::error::Error for StowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for StowError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Self::WorkerPool(e.to_string())
    }
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, StowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = StowError::config("Target directory '/nope' does not exist.");
        assert!(err.is_config());
        assert_eq!(err.to_string(), "Target directory '/nope' does not exist.");
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = StowError::io(
            "mkdir",
            Path::new("/t/a"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(!err.is_config());
        assert!(err.to_string().starts_with("failed:mkdir:/t/a:"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_converts_into_anyhow() {
        let err: anyhow::Error = StowError::WorkerPool("no threads".into()).into();
        assert!(err.downcast_ref::<StowError>().is_some());
    }
}
