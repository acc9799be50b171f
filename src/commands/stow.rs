use super::{StowOptions, StowSummary};
use crate::error::Result;
use crate::executor::{Executor, LinkAction, LinkKind, RemoveMode};
use crate::plan::Plan;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Link every non-ignored leaf of `sources` into `target`.
///
/// Phases, each finishing before the next starts:
/// 1. with `force_remove`, clear targets that are in the way (parallel)
/// 2. create target directories, parents first (sequential)
/// 3. create links in source order (parallel)
///
/// Running it twice with the same arguments changes nothing the second time.
///
/// # Errors
///
/// Returns a configuration error before anything is touched, or the first
/// filesystem failure of the phase that failed
pub fn execute(target: &Path, sources: &[PathBuf], options: &StowOptions) -> Result<StowSummary> {
    let (target, sources) = options.validate_roots(target, sources, true)?;
    if options.dry_run {
        warn!("dry run: no changes will be made");
    }

    let plan = Plan::build(&target, &sources, &options.ignore_file_name)?;
    info!(
        "stow:{}: {} directories, {} links",
        target.display(),
        plan.target_dirs.len(),
        plan.links.len()
    );

    let executor = Executor::new(options.dry_run, options.parallel_threads);
    let mut summary = StowSummary {
        collisions: plan.collisions.clone(),
        dry_run: options.dry_run,
        ..StowSummary::default()
    };

    if options.force_remove {
        let clear = clear_actions(&plan);
        summary.actions.merge(&executor.run_parallel("clear", &clear)?);
    }

    let dirs: Vec<LinkAction> = plan
        .target_dirs
        .iter()
        .cloned()
        .map(LinkAction::MakeDir)
        .collect();
    summary.actions.merge(&executor.run_sequential("mkdir", &dirs)?);

    let links = link_actions(&plan, options);
    summary.actions.merge(&executor.run_parallel("link", &links)?);

    Ok(summary)
}

/// Removals that make room for the plan.
///
/// A file target is removed unless it already refers to its source. At a
/// directory target any non-directory is removed. Directories are never
/// removed.
fn clear_actions(plan: &Plan) -> Vec<LinkAction> {
    let files = plan.stow_links().map(|link| LinkAction::Remove {
        source: link.source.clone(),
        target: link.target.clone(),
        mode: RemoveMode::UnlessLinked,
    });
    let dirs = plan.target_dirs.iter().map(|dir| LinkAction::Remove {
        source: PathBuf::new(),
        target: dir.clone(),
        mode: RemoveMode::Force,
    });
    files.chain(dirs).collect()
}

/// Link creations in source order.
///
/// With `force_remove` the clear phase has already removed every differing
/// target, so links may replace; in a dry run this keeps the log in step with
/// what a real run does.
fn link_actions(plan: &Plan, options: &StowOptions) -> Vec<LinkAction> {
    let kind = if options.create_hardlink {
        LinkKind::Hard
    } else {
        LinkKind::Soft {
            absolute: options.create_absolute_link,
        }
    };
    plan.stow_links()
        .map(|link| LinkAction::Link {
            source: link.source.clone(),
            target: link.target.clone(),
            kind,
            replace: options.update_target || options.force_remove,
        })
        .collect()
}
