//! Command-line interface definitions for nzmstow.
//!
//! The CLI definitions are shared between the main binary and the xtask
//! crate for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes,
//! so we allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::{ArgAction, Parser};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Main CLI structure for nzmstow.
#[derive(Parser, Debug)]
#[command(
    name = "nzmstow",
    version = crate::VERSION,
    about = "Link the contents of source directories into a target directory",
    long_about = "Projects one or more source trees into a target tree with per-file \
                  symlinks or hard links, honoring gitignore-style ignore files, and \
                  removes them again with -D"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Source directories, linked in the given order
    #[arg(value_name = "SOURCE", required_unless_present = "completions")]
    pub sources: Vec<PathBuf>,

    /// Target directory (default: config default_target, else the current directory)
    #[arg(short = 't', long = "target", value_name = "TARGET")]
    pub target: Option<PathBuf>,

    /// Unstow: remove the links instead of creating them
    #[arg(short = 'D', long = "delete")]
    pub delete: bool,

    /// Stow: clear conflicting targets first. Unstow: remove targets that no
    /// longer refer to their source
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Replace a target that differs from its source
    #[arg(short = 'u', long = "update")]
    pub update: bool,

    /// Log what would be done without changing anything
    #[arg(short = 'n', long = "dry-run")]
    pub dry_run: bool,

    /// Create hard links instead of symlinks
    #[arg(short = 'l', long = "hard")]
    pub hard: bool,

    /// Store absolute paths in symlinks
    #[arg(short = 'A', long = "absolute")]
    pub absolute: bool,

    /// Increase logging verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Decrease logging verbosity (repeatable)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    /// Name of the per-directory ignore files
    #[arg(long = "ignore-name", value_name = "NAME")]
    pub ignore_name: Option<String>,

    /// Worker threads for parallel phases (0: one per CPU)
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    pub jobs: Option<usize>,

    /// Configuration file (default: $NZMSTOW_CONFIG_PATH, else ~/.config/nzmstow/config.toml)
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print a shell completion script and exit
    #[arg(long = "completions", value_name = "SHELL", value_enum)]
    pub completions: Option<Shell>,
}

impl Cli {
    /// Log level selected by `-v` and `-q`
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        match i16::from(self.verbose) - i16::from(self.quiet) {
            i16::MIN..=-2 => LevelFilter::OFF,
            -1 => LevelFilter::ERROR,
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            _ => LevelFilter::DEBUG,
        }
    }
}
