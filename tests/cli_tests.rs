mod common;

use anyhow::Result;
use assert_cmd::Command;
use common::StowFarm;
use predicates::prelude::*;
use std::fs;

/// The binary with an isolated home and no user configuration
fn nzmstow(farm: &StowFarm) -> Result<Command> {
    let mut cmd = Command::cargo_bin("nzmstow")?;
    cmd.env("HOME", farm.temp_dir.path())
        .env("NZMSTOW_CONFIG_PATH", farm.temp_dir.path().join("no-config.toml"))
        .env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn test_stow_and_unstow() -> Result<()> {
    let farm = StowFarm::new()?;
    let src = farm.source("dots")?;
    StowFarm::write(&src, ".config/app/rc", "rc")?;

    nzmstow(&farm)?
        .arg("-t")
        .arg(&farm.target)
        .arg(&src)
        .assert()
        .success()
        .stderr(predicate::str::contains("stow: 3 changed"));
    assert_eq!(fs::read_to_string(farm.target.join(".config/app/rc"))?, "rc");

    nzmstow(&farm)?
        .arg("-D")
        .arg("-t")
        .arg(&farm.target)
        .arg(&src)
        .assert()
        .success();
    assert!(farm.target_entries().is_empty());
    Ok(())
}

#[test]
fn test_dry_run_logs_actions() -> Result<()> {
    let farm = StowFarm::new()?;
    let src = farm.source("dots")?;
    StowFarm::write(&src, "file", "")?;

    nzmstow(&farm)?
        .args(["-n", "-v", "-t"])
        .arg(&farm.target)
        .arg(&src)
        .assert()
        .success()
        .stderr(predicate::str::contains("dry run"))
        .stderr(predicate::str::contains("symlink:"));
    assert!(farm.target_entries().is_empty());
    Ok(())
}

#[test]
fn test_missing_target_fails() -> Result<()> {
    let farm = StowFarm::new()?;
    let src = farm.source("dots")?;

    nzmstow(&farm)?
        .arg("-t")
        .arg(farm.temp_dir.path().join("missing"))
        .arg(&src)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
    Ok(())
}

#[test]
fn test_runtime_failure_exits_with_2() -> Result<()> {
    let farm = StowFarm::new()?;
    let src = farm.source("dots")?;
    StowFarm::write(&src, ".config/app/rc", "rc")?;
    // A file where a directory is planned makes mkdir of its child fail
    StowFarm::write(&farm.target, ".config", "not a dir")?;

    nzmstow(&farm)?
        .arg("-t")
        .arg(&farm.target)
        .arg(&src)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("failed:mkdir:"));
    Ok(())
}

#[test]
fn test_config_path_from_environment() -> Result<()> {
    let farm = StowFarm::new()?;
    let src = farm.source("dots")?;
    let config = StowFarm::write(farm.temp_dir.path(), "env.toml", "[core]\nignore_file_name = \"\"\n")?;

    nzmstow(&farm)?
        .env("NZMSTOW_CONFIG_PATH", &config)
        .arg("-t")
        .arg(&farm.target)
        .arg(&src)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("must not be empty"));
    Ok(())
}

#[test]
fn test_sources_are_required() -> Result<()> {
    let farm = StowFarm::new()?;
    nzmstow(&farm)?.arg("-t").arg(&farm.target).assert().failure();
    Ok(())
}

#[test]
fn test_config_file_sets_defaults() -> Result<()> {
    let farm = StowFarm::new()?;
    let src = farm.source("dots")?;
    StowFarm::write(&src, "x", "content")?;
    let config = StowFarm::write(
        farm.temp_dir.path(),
        "nzmstow.toml",
        &format!(
            "[core]\ndefault_target = \"{}\"\n[link]\nhard = true\n",
            farm.target.display()
        ),
    )?;

    nzmstow(&farm)?
        .arg("--config")
        .arg(&config)
        .arg(&src)
        .assert()
        .success();

    assert!(!farm.target.join("x").is_symlink());
    assert!(nzmstow::utils::same_file(&src.join("x"), &farm.target.join("x")));
    Ok(())
}

#[test]
fn test_invalid_config_fails() -> Result<()> {
    let farm = StowFarm::new()?;
    let src = farm.source("dots")?;
    let config = StowFarm::write(farm.temp_dir.path(), "bad.toml", "[core]\nignore_file_name = \"\"\n")?;

    nzmstow(&farm)?
        .arg("--config")
        .arg(&config)
        .arg("-t")
        .arg(&farm.target)
        .arg(&src)
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be empty"));
    Ok(())
}

#[test]
fn test_completions() -> Result<()> {
    let farm = StowFarm::new()?;
    nzmstow(&farm)?
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nzmstow"));
    Ok(())
}
