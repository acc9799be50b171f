#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
// Allow pedantic strict lints that create false positives in this codebase
#![allow(clippy::arithmetic_side_effects)] // Simple counters cannot overflow
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # nzmstow - symlink farm manager
//!
//! nzmstow projects the contents of one or more source directory trees into
//! a single target tree with one link per file, and removes those links
//! again. Per-directory ignore files in gitignore syntax keep entries out of
//! the target.
//!
//! ## Architecture
//!
//! - [`ignore`]: glob matching, ignore rule parsing and ignore set resolution
//! - [`scanner`]: breadth-first source tree scanning
//! - [`plan`]: merging scans of several sources into one plan
//! - [`executor`]: applying plan actions across a worker pool
//! - [`commands`]: the [`stow`] and [`unstow`] entry points and their options
//! - [`config`]: the optional TOML configuration file
//! - [`utils`]: path helpers and the worker pool
//!
//! ## Example Usage
//!
//! ```no_run
//! use nzmstow::StowOptions;
//! use std::path::{Path, PathBuf};
//!
//! # fn main() -> nzmstow::Result<()> {
//! let options = StowOptions {
//!     dry_run: true,
//!     ..StowOptions::default()
//! };
//! let sources = [PathBuf::from("/home/me/dots/vim")];
//!
//! let summary = nzmstow::stow(Path::new("/home/me"), &sources, &options)?;
//! println!("{} links would be created", summary.actions.simulated);
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Stow and unstow entry points with their options.
pub mod commands;

/// Configuration file parsing and defaults.
pub mod config;

/// Error type for library operations.
pub mod error;

/// Applying planned filesystem actions.
pub mod executor;

/// Ignore file parsing and resolution.
pub mod ignore;

/// Merging scan results into a link plan.
pub mod plan;

/// Source tree scanning.
pub mod scanner;

/// Utility functions and helpers.
pub mod utils;

pub use commands::stow::execute as stow;
pub use commands::unstow::execute as unstow;
pub use commands::{DEFAULT_IGNORE_NAME, StowOptions, StowSummary};
pub use error::{Result, StowError};

/// Current version of the nzmstow binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
