use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use nzmstow::cli::Cli;
use nzmstow::commands::{self, StowOptions};
use nzmstow::StowError;
use nzmstow::config::Config;
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        commands::print_error(&format!("{e:#}"));
        process::exit(exit_code(&e));
    }
}

/// 1 for configuration problems, 2 for failures while applying actions
fn exit_code(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<StowError>() {
        Some(err) if !err.is_config() => 2,
        _ => 1,
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    init_logging(&cli);

    let config_path = Config::locate(cli.config.as_deref())?;
    let config = Config::load(&config_path)?;
    tracing::debug!("config:{}", config_path.display());

    let target = match (&cli.target, config.default_target()?) {
        (Some(target), _) => target.clone(),
        (None, Some(target)) => target,
        (None, None) => std::env::current_dir().context("Could not read current directory")?,
    };
    let options = build_options(&cli, &config);

    let summary = if cli.delete {
        commands::unstow::execute(&target, &cli.sources, &options)?
    } else {
        commands::stow::execute(&target, &cli.sources, &options)?
    };

    if cli.quiet == 0 {
        let verb = if cli.delete { "unstow" } else { "stow" };
        if !summary.collisions.is_empty() {
            commands::print_warning(&format!(
                "{} target paths provided by more than one source",
                summary.collisions.len()
            ));
        }
        commands::print_success(&summary.describe(verb));
    }

    Ok(())
}

/// Install the stderr subscriber; `RUST_LOG` overrides `-v`/`-q`
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(cli.log_level().into()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Config file values overridden by command-line flags
fn build_options(cli: &Cli, config: &Config) -> StowOptions {
    let mut options = config.to_options();
    options.dry_run = cli.dry_run;
    options.force_remove = cli.force;
    options.update_target = cli.update;
    options.create_hardlink |= cli.hard;
    options.create_absolute_link |= cli.absolute;
    if let Some(name) = &cli.ignore_name {
        options.ignore_file_name.clone_from(name);
    }
    if let Some(jobs) = cli.jobs {
        options.parallel_threads = jobs;
    }
    options
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
