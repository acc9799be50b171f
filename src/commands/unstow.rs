use super::{StowOptions, StowSummary};
use crate::error::Result;
use crate::executor::{Executor, LinkAction, RemoveMode};
use crate::plan::Plan;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Remove the links `stow` would create for `sources` under `target`.
///
/// Targets that no longer refer to their source are left alone unless
/// `force_remove` is set. Afterwards every planned directory is removed
/// deepest first if it is empty; directories holding anything else stay.
///
/// # Errors
///
/// Returns a configuration error before anything is touched, or the first
/// filesystem failure of the phase that failed
pub fn execute(target: &Path, sources: &[PathBuf], options: &StowOptions) -> Result<StowSummary> {
    let (target, sources) = options.validate_roots(target, sources, false)?;
    if options.dry_run {
        warn!("dry run: no changes will be made");
    }

    let plan = Plan::build(&target, &sources, &options.ignore_file_name)?;
    info!(
        "unstow:{}: {} links, {} directories",
        target.display(),
        plan.claims.len(),
        plan.target_dirs.len()
    );

    let executor = Executor::new(options.dry_run, options.parallel_threads);
    let mut summary = StowSummary {
        collisions: plan.collisions.clone(),
        dry_run: options.dry_run,
        ..StowSummary::default()
    };

    let mode = if options.force_remove {
        RemoveMode::Force
    } else {
        RemoveMode::IfLinked
    };
    let removals: Vec<LinkAction> = plan
        .unstow_links()
        .map(|link| LinkAction::Remove {
            source: link.source.clone(),
            target: link.target.clone(),
            mode,
        })
        .collect();
    summary.actions.merge(&executor.run_parallel("remove", &removals)?);

    let dirs: Vec<LinkAction> = plan.unstow_dirs().cloned().map(LinkAction::RemoveDir).collect();
    summary.actions.merge(&executor.run_sequential("rmdir", &dirs)?);

    Ok(summary)
}
