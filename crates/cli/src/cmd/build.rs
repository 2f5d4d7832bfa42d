//! Implementation of the `pakmerge build` command.
//!
//! Gathers every mod source, builds one composite artifact and installs it
//! into the game's reserved mod directory, replacing the previous one.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use tracing::info;

use pakmerge_lib::build::{ArtifactKind, LoggingDispatcher, PakBuilder};
use pakmerge_lib::pipeline::{self, RunContext, RunOptions, RunReport};
use pakmerge_lib::platform::paths;
use pakmerge_lib::run_lock::RunLock;

use super::{display, resolve_game};
use crate::output::{
  OutputFormat, format_duration, print_info, print_json, print_stat, print_success, print_warning, symbols,
  truncate_hash,
};

#[derive(Debug, Default)]
pub struct BuildArgs {
  pub preset_paths: Vec<PathBuf>,
  pub install_path: Option<PathBuf>,
  pub no_clean: bool,
  pub loose: bool,
  pub name: Option<String>,
  pub output: OutputFormat,
}

pub fn cmd_build(args: BuildArgs) -> Result<()> {
  let start = Instant::now();
  let (settings, game_dir) = resolve_game(args.install_path)?;

  let options = RunOptions {
    extra_preset_paths: args.preset_paths,
    skip_clean: args.no_clean,
    pack: args.loose.then_some(false),
    name: args.name,
  };
  let ctx = RunContext::new(&game_dir, &settings, options);
  info!(game = %ctx.game_dir().display(), install = %ctx.install_dir().display(), "starting build");

  let _lock = RunLock::acquire(ctx.paks_dir(), ctx.game_dir(), "build")?;

  let dispatcher = LoggingDispatcher::new(PakBuilder::new(paths::staging_dir()));
  let report = pipeline::run(&ctx, &dispatcher)?;

  if args.output.is_json() {
    return print_json(&report);
  }
  print_report(&report, start);
  Ok(())
}

fn print_report(report: &RunReport, start: Instant) {
  let stats = &report.stats;

  for diagnostic in &report.diagnostics {
    print_warning(&format!("Skipped {}", diagnostic));
  }

  print_info(&format!("Loaded {} installed composite mods", stats.installed_mods));
  print_info(&format!(
    "Loaded {} embedded presets from installed mods",
    stats.embedded_presets
  ));
  print_info(&format!("Loaded {} loose presets", stats.loose_presets));
  print_info(&format!("Building with {} parameters", stats.parameters));
  print_info(&format!("Compiled slot assignments with {} patches", stats.slot_patches));
  print_info(&format!("Queued {} mods for build", stats.queued_mods));

  let kind = match report.kind {
    ArtifactKind::Packed => "packed",
    ArtifactKind::Loose => "loose",
  };
  let name = report
    .install
    .path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default();
  println!();
  print_success(&format!(
    "Installed {} artifact {} {} ({})",
    kind,
    symbols::ARROW,
    name,
    format_duration(start.elapsed())
  ));
  print_stat("Path", &display(&report.install.path));
  print_stat("Hash", truncate_hash(&report.content_hash.0));
  if !report.install.removed.is_empty() {
    print_stat("Replaced", &report.install.removed.len().to_string());
  }
}
