//! Status command implementation.
//!
//! Lists installed composite mods and anything discovery had to skip,
//! without building.

use std::path::PathBuf;

use anyhow::Result;

use pakmerge_lib::discovery::ModDiscovery;
use pakmerge_lib::pipeline::{RunContext, RunOptions};

use super::{display, resolve_game};
use crate::output::{format_timestamp, print_info, print_json, print_stat, print_success, print_warning, symbols};

pub fn cmd_status(install_path: Option<PathBuf>, verbose: bool, json: bool) -> Result<()> {
  let (settings, game_dir) = resolve_game(install_path)?;
  let ctx = RunContext::new(&game_dir, &settings, RunOptions::default());

  let discovered = ModDiscovery::new(ctx.discovery_dirs())
    .with_preset_extension(ctx.preset_extension())
    .discover();

  if json {
    let installed: Vec<_> = discovered
      .installed
      .iter()
      .map(|m| {
        serde_json::json!({
          "name": m.manifest.name,
          "source": m.source,
          "created_at": m.manifest.created_at,
          "mods": m.mods().len(),
          "parameters": m.template_inputs().len(),
        })
      })
      .collect();
    let json_output = serde_json::json!({
      "game_dir": ctx.game_dir(),
      "install_dir": ctx.install_dir(),
      "installed": installed,
      "embedded_presets": discovered.embedded_presets.len(),
      "diagnostics": discovered.diagnostics,
    });
    return print_json(&json_output);
  }

  print_success(&format!("Game directory: {}", display(ctx.game_dir())));
  print_stat("Install target", &display(ctx.install_dir()));
  print_stat("Embedded presets", &discovered.embedded_presets.len().to_string());
  println!();

  if discovered.installed.is_empty() {
    print_info("No composite mods installed. Run 'pakmerge build' to create one.");
  }
  for installed in &discovered.installed {
    print_info(&format!(
      "{} ({} mods, {} parameters)",
      installed.manifest.name,
      installed.mods().len(),
      installed.template_inputs().len()
    ));
    print_stat("Source", &display(&installed.source));
    print_stat("Built", &format_timestamp(installed.manifest.created_at));
    if verbose {
      for m in installed.mods() {
        println!("    {} {}", symbols::INFO, m.name);
      }
    }
  }

  for diagnostic in &discovered.diagnostics {
    print_warning(&format!("Skipped {}", diagnostic));
  }
  Ok(())
}
