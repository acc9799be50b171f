//! Applying planned actions to the target tree.
//!
//! Directory phases run sequentially because every `mkdir` needs its parent
//! and every `rmdir` needs its children gone. Link and remove phases touch
//! disjoint paths and are split into contiguous batches, one per worker.
//! Each batch runs in order and stops at its first failure. Every batch is
//! awaited before the phase reports its first error.

/// Individual filesystem actions and their outcomes
pub mod actions;

pub use actions::{LinkAction, LinkKind, Outcome, RemoveMode};

use crate::error::Result;
use crate::utils::batch_size;
use crate::utils::thread_pool::get_thread_pool;
use rayon::prelude::*;
use tracing::{debug, error};

/// Counts of action outcomes over one or more phases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Actions that changed the filesystem
    pub applied: usize,
    /// Actions whose result was already in place
    pub already_satisfied: usize,
    /// Actions left undone because of a non-fatal conflict
    pub skipped: usize,
    /// Actions only logged because of dry-run mode
    pub simulated: usize,
}

impl ExecutionReport {
    /// Count one outcome
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Applied => self.applied += 1,
            Outcome::AlreadySatisfied => self.already_satisfied += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Simulated => self.simulated += 1,
        }
    }

    /// Add another report's counts to this one
    pub fn merge(&mut self, other: &Self) {
        self.applied += other.applied;
        self.already_satisfied += other.already_satisfied;
        self.skipped += other.skipped;
        self.simulated += other.simulated;
    }

    /// Number of actions counted
    #[must_use]
    pub const fn total(&self) -> usize {
        self.applied + self.already_satisfied + self.skipped + self.simulated
    }
}

/// Runs action phases with a shared dry-run flag and worker count
#[derive(Debug, Clone, Copy)]
pub struct Executor {
    /// Log actions instead of applying them
    dry_run: bool,
    /// Worker threads for parallel phases, 0 for one per CPU
    threads: usize,
}

impl Executor {
    /// Create an executor
    #[must_use]
    pub const fn new(dry_run: bool, threads: usize) -> Self {
        Self { dry_run, threads }
    }

    /// Apply `actions` one after another, stopping at the first failure
    ///
    /// # Errors
    ///
    /// Returns the first fatal action error
    pub fn run_sequential(&self, phase: &str, actions: &[LinkAction]) -> Result<ExecutionReport> {
        debug!("phase:{phase}: {} actions", actions.len());
        run_batch(actions, self.dry_run)
    }

    /// Apply `actions` in parallel batches
    ///
    /// # Errors
    ///
    /// Returns the first failure in batch order after every batch finished,
    /// or an error if the worker pool cannot be created
    pub fn run_parallel(&self, phase: &str, actions: &[LinkAction]) -> Result<ExecutionReport> {
        if actions.is_empty() {
            return Ok(ExecutionReport::default());
        }

        let pool = get_thread_pool(self.threads)?;
        let size = batch_size(actions.len(), pool.current_num_threads());
        debug!(
            "phase:{phase}: {} actions in batches of {size}",
            actions.len()
        );

        let dry_run = self.dry_run;
        let results: Vec<Result<ExecutionReport>> = pool.install(|| {
            actions
                .par_chunks(size)
                .map(|batch| run_batch(batch, dry_run))
                .collect()
        });

        let mut report = ExecutionReport::default();
        let mut first_error = None;
        for result in results {
            match result {
                Ok(batch) => report.merge(&batch),
                Err(e) if first_error.is_none() => first_error = Some(e),
                Err(e) => error!("phase:{phase}: {e}"),
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }
}

/// Apply a batch in order, stopping at its first failure
fn run_batch(batch: &[LinkAction], dry_run: bool) -> Result<ExecutionReport> {
    let mut report = ExecutionReport::default();
    for action in batch {
        report.record(action.apply(dry_run)?);
    }
    Ok(report)
}
