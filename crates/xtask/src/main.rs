use std::fs;
use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "evx maintainer tasks")]
struct Cli {
    #[command(subcommand)]
    command: Option<CommandName>,
}

#[derive(Debug, Default, Subcommand)]
enum CommandName {
    /// Update default_config.toml by running `evx config generate`.
    #[default]
    UpdateDefaultConfig,
    /// Check that every CLI test fixture still decodes as an event.
    CheckFixtures,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or_default() {
        CommandName::UpdateDefaultConfig => update_default_config(),
        CommandName::CheckFixtures => check_fixtures(),
    }
}

/// Runs `cargo run -p evx -- <args>` with an empty `EVX_HOME` so a local
/// config never leaks into generated files.
fn run_evx(args: &[&str]) -> Result<Vec<u8>> {
    let root = project_root()?;
    let home = tempfile::tempdir().context("create temp dir for EVX_HOME")?;

    let output = Command::new("cargo")
        .current_dir(&root)
        .env("EVX_HOME", home.path())
        .args(["run", "--quiet", "-p", "evx", "--"])
        .args(args)
        .output()
        .with_context(|| format!("run `cargo run -p evx -- {}`", args.join(" ")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("`evx {}` failed: {stderr}", args.join(" "));
    }
    Ok(output.stdout)
}

fn update_default_config() -> Result<()> {
    let dest = project_root()?
        .join("crates")
        .join("evx-core")
        .join("default_config.toml");

    let generated = run_evx(&["config", "generate"])?;
    fs::write(&dest, generated).with_context(|| format!("write config to {}", dest.display()))?;

    println!("Updated {}", dest.display());
    Ok(())
}

fn check_fixtures() -> Result<()> {
    let dir = project_root()?
        .join("crates")
        .join("evx-cli")
        .join("tests")
        .join("fixtures");

    let mut checked = 0;
    for entry in fs::read_dir(&dir).with_context(|| format!("read {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        let path_str = path.to_string_lossy();
        run_evx(&["threads", "show", "--json", &path_str])
            .with_context(|| format!("fixture {}", path.display()))?;
        checked += 1;
    }

    println!("Checked {checked} fixture(s) in {}", dir.display());
    Ok(())
}

fn project_root() -> Result<PathBuf> {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let root = manifest_dir
        .ancestors()
        .nth(2)
        .context("locate workspace root from CARGO_MANIFEST_DIR")?;
    Ok(root.to_path_buf())
}
